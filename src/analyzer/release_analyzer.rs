use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{CommitParser, ParsedCommit, ReleaseLevel, ReleaseRule};
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use tracing::{debug, info};

/// Outcome for a single commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitClassification {
    pub commit: ParsedCommit,
    pub level: ReleaseLevel,
    /// Position of the rule that decided, `None` when no rule matched
    pub rule_index: Option<usize>,
}

/// Outcome for a batch of commits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Per-commit classifications, in input order
    pub commits: Vec<CommitClassification>,
    /// Highest level over all commits
    pub level: ReleaseLevel,
}

impl Analysis {
    pub fn is_release(&self) -> bool {
        self.level.is_release()
    }

    pub fn parsed_commits(&self) -> impl Iterator<Item = &ParsedCommit> {
        self.commits.iter().map(|c| &c.commit)
    }

    /// Commits whose header is not conventional
    pub fn warnings(&self) -> Vec<BoundaryWarning> {
        self.commits
            .iter()
            .filter(|c| !c.commit.is_conventional())
            .map(|c| BoundaryWarning::NonConventionalCommit {
                hash: c.commit.hash.clone(),
                header: c.commit.subject.clone(),
            })
            .collect()
    }
}

/// Classifies commits against an ordered rule table.
///
/// For one commit the first matching rule decides; a batch takes the
/// highest level of its commits.
pub struct ReleaseAnalyzer {
    rules: Vec<ReleaseRule>,
    parser: CommitParser,
}

impl ReleaseAnalyzer {
    pub fn new(rules: Vec<ReleaseRule>, parser: CommitParser) -> Self {
        ReleaseAnalyzer { rules, parser }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ReleaseAnalyzer::new(
            config.release_rules.clone(),
            config.commit_parser()?,
        ))
    }

    pub fn rules(&self) -> &[ReleaseRule] {
        &self.rules
    }

    pub fn parser(&self) -> &CommitParser {
        &self.parser
    }

    /// Level of one commit and the index of the deciding rule
    pub fn classify(&self, commit: &ParsedCommit) -> (ReleaseLevel, Option<usize>) {
        match self.rules.iter().position(|rule| rule.matches(commit)) {
            Some(index) => (self.rules[index].release, Some(index)),
            None => (ReleaseLevel::None, None),
        }
    }

    pub fn analyze(&self, commits: Vec<ParsedCommit>) -> Analysis {
        let mut analysis = Analysis::default();

        for commit in commits {
            let (level, rule_index) = self.classify(&commit);
            match rule_index {
                Some(i) => debug!(
                    commit = commit.short_hash(),
                    rule = %self.rules[i],
                    "classified as {}",
                    level
                ),
                None => debug!(commit = commit.short_hash(), "no rule matched"),
            }

            analysis.level = analysis.level.max(level);
            analysis.commits.push(CommitClassification {
                commit,
                level,
                rule_index,
            });
        }

        info!(
            commits = analysis.commits.len(),
            "release level: {}",
            analysis.level
        );
        analysis
    }

    pub fn analyze_commits(&self, commits: &[CommitInfo]) -> Analysis {
        let parsed = commits
            .iter()
            .map(|c| self.parser.parse(&c.hash, &c.message))
            .collect();
        self.analyze(parsed)
    }

    /// Batch level of bare commit messages
    pub fn analyze_messages(&self, messages: &[String]) -> ReleaseLevel {
        messages
            .iter()
            .map(|m| self.classify(&self.parser.parse("", m)).0)
            .max()
            .unwrap_or_default()
    }

    /// Analyze commits reachable from `to_oid` but not from `from_oid`
    pub fn analyze_repository_range<R: Repository>(
        &self,
        repo: &R,
        from_oid: Option<Oid>,
        to_oid: Oid,
    ) -> Result<Analysis> {
        let commits = repo.commits_between(from_oid, to_oid)?;
        Ok(self.analyze_commits(&commits))
    }
}
