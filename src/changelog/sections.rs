use crate::domain::ParsedCommit;
use serde::{Deserialize, Serialize};

/// Maps a commit type to a changelog section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMapping {
    #[serde(rename = "type")]
    pub r#type: String,

    /// Display title; falls back to the type when empty
    #[serde(default)]
    pub section: String,

    /// Hidden sections are never rendered, their commits still count toward the release
    #[serde(default)]
    pub hidden: bool,
}

impl SectionMapping {
    pub fn new(commit_type: impl Into<String>, section: impl Into<String>) -> Self {
        SectionMapping {
            r#type: commit_type.into(),
            section: section.into(),
            hidden: false,
        }
    }

    pub fn hidden(commit_type: impl Into<String>, section: impl Into<String>) -> Self {
        SectionMapping {
            hidden: true,
            ..SectionMapping::new(commit_type, section)
        }
    }

    pub fn title(&self) -> &str {
        if self.section.is_empty() {
            &self.r#type
        } else {
            &self.section
        }
    }
}

/// One line of the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub scope: Option<String>,
    pub subject: String,
    pub hash: String,
}

impl From<&ParsedCommit> for ChangelogEntry {
    fn from(commit: &ParsedCommit) -> Self {
        ChangelogEntry {
            scope: commit.scope.clone(),
            subject: commit.subject.clone(),
            hash: commit.hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSection {
    pub title: String,
    pub entries: Vec<ChangelogEntry>,
}

/// Group commits into visible sections.
///
/// Sections come out in mapping order; hidden mappings, unmapped types,
/// non-conventional commits and empty sections are left out. Within a
/// section commits keep their input order.
pub fn assemble_sections<'a, I>(mappings: &[SectionMapping], commits: I) -> Vec<ChangelogSection>
where
    I: IntoIterator<Item = &'a ParsedCommit>,
{
    let mut buckets: Vec<Vec<ChangelogEntry>> = vec![Vec::new(); mappings.len()];

    for commit in commits {
        let Some(commit_type) = commit.r#type.as_deref() else {
            continue;
        };
        if let Some(index) = mappings.iter().position(|m| m.r#type == commit_type) {
            buckets[index].push(ChangelogEntry::from(commit));
        }
    }

    mappings
        .iter()
        .zip(buckets)
        .filter(|(mapping, entries)| !mapping.hidden && !entries.is_empty())
        .map(|(mapping, entries)| ChangelogSection {
            title: mapping.title().to_string(),
            entries,
        })
        .collect()
}

/// Breaking-change notes across all commits, hidden types included.
/// A `!` marker without a note contributes the commit subject.
pub fn collect_breaking_notes<'a, I>(commits: I) -> Vec<ChangelogEntry>
where
    I: IntoIterator<Item = &'a ParsedCommit>,
{
    let mut notes = Vec::new();
    for commit in commits.into_iter().filter(|c| c.is_breaking_change) {
        if commit.notes.is_empty() {
            notes.push(ChangelogEntry::from(commit));
        } else {
            notes.extend(commit.notes.iter().map(|note| ChangelogEntry {
                scope: commit.scope.clone(),
                subject: note.clone(),
                hash: commit.hash.clone(),
            }));
        }
    }
    notes
}
