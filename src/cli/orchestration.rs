//! Release workflow orchestration
//!
//! The pipeline behind the `analyze`, `changelog` and `release` commands,
//! kept apart from argument parsing so it can run against any
//! [`Repository`] implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use git2::Oid;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::analyzer::{Analysis, ReleaseAnalyzer};
use crate::boundary::BoundaryWarning;
use crate::changelog::{build_release_notes, prepend_changelog, ReleaseNotes};
use crate::config::Config;
use crate::domain::{next_version, LastRelease, NextRelease};
use crate::git::{find_release_tags, ReleaseTags, Repository};
use crate::notify::{Dispatcher, NotificationKind, Notifier, TemplateContext};

/// Arguments for the release workflow
///
/// Mirrors the CLI arguments without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Branch to release, defaults to the checked out branch
    pub branch: Option<String>,

    /// Compute everything but create no tag, write no file, send nothing
    pub dry_run: bool,

    /// Changelog file the release notes are prepended to
    pub changelog_file: Option<PathBuf>,

    /// Date printed in the release notes heading
    pub date: NaiveDate,
}

/// Everything known about a branch before anything is written
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub branch: String,
    pub head: Oid,
    pub tags: ReleaseTags,
    pub analysis: Analysis,
    /// `None` when the commits call for no release
    pub next_release: Option<NextRelease>,
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleasePlan {
    /// Release the commit range starts after
    pub fn last_release(&self) -> Option<&LastRelease> {
        self.tags.range_start()
    }

    /// Release notes for the planned release
    pub fn release_notes(&self, config: &Config, date: NaiveDate) -> Option<ReleaseNotes> {
        let next = self.next_release.as_ref()?;
        let commits: Vec<_> = self.analysis.parsed_commits().cloned().collect();
        Some(build_release_notes(
            &config.changelog.sections,
            &commits,
            next,
            self.last_release(),
            config.repository_url.as_deref(),
            date,
        ))
    }
}

/// Result of a completed release
#[derive(Debug, Clone)]
pub struct ReleaseResult {
    pub plan: ReleasePlan,
    pub next_release: NextRelease,
    pub notes: ReleaseNotes,
    pub tag_created: bool,
    pub notified: bool,
}

#[derive(Debug, Clone)]
pub enum WorkflowOutcome {
    /// Commits call for no release; nothing was written or sent
    NoRelease(ReleasePlan),
    Released(Box<ReleaseResult>),
}

/// Branch given on the command line, or the checked out one
pub fn resolve_branch<R: Repository>(repo: &R, branch: Option<&str>) -> Result<String> {
    match branch {
        Some(name) => Ok(name.to_string()),
        None => repo
            .current_branch()
            .context("Failed to determine the current branch"),
    }
}

/// Classify the commits of `branch` since its last release and compute
/// the next release, without touching the repository
pub fn plan_release<R: Repository>(repo: &R, config: &Config, branch: &str) -> Result<ReleasePlan> {
    let branch_set = config.branch_set()?;
    let rule = branch_set.resolve(branch)?;
    let prerelease = rule.prerelease_type()?;
    let tag_format = config.tag_format()?;

    let head = repo
        .branch_head_oid(branch)
        .with_context(|| format!("Failed to read head of branch '{}'", branch))?;
    let tags = find_release_tags(repo, head, &tag_format, prerelease.as_ref())?;

    let analyzer = ReleaseAnalyzer::from_config(config)?;
    let start = tags.range_start();
    let analysis = analyzer
        .analyze_repository_range(repo, start.map(|l| l.oid), head)
        .with_context(|| format!("Failed to read commits of branch '{}'", branch))?;

    let mut warnings = tags.warnings.clone();
    if analysis.commits.is_empty() {
        if let Some(last) = start {
            warnings.push(BoundaryWarning::NoNewCommits {
                latest_tag: last.git_tag.clone(),
                current_commit_hash: head.to_string(),
            });
        }
    }
    warnings.extend(analysis.warnings());

    let version = next_version(
        tags.last_release.as_ref().map(|l| &l.version),
        tags.last_prerelease.as_ref().map(|l| &l.version),
        analysis.level,
        prerelease.as_ref(),
        &config.initial_version()?,
    )?;

    let next_release = version.map(|version| NextRelease {
        git_tag: tag_format.format(&version),
        version,
        level: analysis.level,
        channel: rule.channel().map(str::to_string),
    });

    match &next_release {
        Some(next) => info!(branch, version = %next.version, "next release planned"),
        None => info!(branch, "no release needed"),
    }

    Ok(ReleasePlan {
        branch: branch.to_string(),
        head,
        tags,
        analysis,
        next_release,
        warnings,
    })
}

/// Full release pipeline: plan, tag, write notes, notify.
///
/// Both templates are checked before any step runs. When a later step
/// fails the failure template is rendered and dispatched before the error
/// is returned. Dry runs send no notification at all.
pub fn run_release_workflow<R: Repository>(
    repo: &R,
    config: &Config,
    args: &ReleaseWorkflowArgs,
    dispatcher: &dyn Dispatcher,
    context: TemplateContext,
) -> Result<WorkflowOutcome> {
    let notifier = Notifier::new(&config.notifications)?;
    let mut context = context;

    let result = resolve_branch(repo, args.branch.as_deref()).and_then(|branch| {
        context = std::mem::take(&mut context).with_branch(branch.as_str());
        execute_release(repo, config, args, &branch, &notifier, dispatcher, &context)
    });

    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            if !args.dry_run {
                notify_failure(&notifier, dispatcher, &context, &e);
            }
            Err(e)
        }
    }
}

fn execute_release<R: Repository>(
    repo: &R,
    config: &Config,
    args: &ReleaseWorkflowArgs,
    branch: &str,
    notifier: &Notifier,
    dispatcher: &dyn Dispatcher,
    context: &TemplateContext,
) -> Result<WorkflowOutcome> {
    let plan = plan_release(repo, config, branch)?;

    let Some(next) = plan.next_release.clone() else {
        return Ok(WorkflowOutcome::NoRelease(plan));
    };
    let notes = plan
        .release_notes(config, args.date)
        .context("Release notes unavailable for planned release")?;

    if args.dry_run {
        return Ok(WorkflowOutcome::Released(Box::new(ReleaseResult {
            plan,
            next_release: next,
            notes,
            tag_created: false,
            notified: false,
        })));
    }

    repo.create_tag(&next.git_tag, plan.head)
        .with_context(|| format!("Failed to create tag '{}'", next.git_tag))?;
    info!(tag = %next.git_tag, "created tag");

    if let Some(path) = &args.changelog_file {
        prepend_changelog(path, &notes.render())
            .with_context(|| format!("Failed to write changelog '{}'", path.display()))?;
    }

    let success_context = context
        .clone()
        .with_next_release(next.clone())
        .with_last_release(plan.last_release().cloned());
    let notified = notifier.notify(
        NotificationKind::Success,
        &success_context,
        &[
            ("version", next.version.to_string()),
            ("tag", next.git_tag.clone()),
            ("branch", plan.branch.clone()),
        ],
        dispatcher,
    )?;

    Ok(WorkflowOutcome::Released(Box::new(ReleaseResult {
        plan,
        next_release: next,
        notes,
        tag_created: true,
        notified,
    })))
}

fn notify_failure(
    notifier: &Notifier,
    dispatcher: &dyn Dispatcher,
    context: &TemplateContext,
    error: &anyhow::Error,
) {
    let metadata = [("error", format!("{:#}", error))];
    if let Err(e) = notifier.notify(NotificationKind::Failure, context, &metadata, dispatcher) {
        warn!(error = %e, "failure notification could not be rendered");
    }
}
