//! Changelog section assembly and rendering
//!
//! - `sections` - group commits by type following the section mapping
//! - `render` - markdown output for one release
//! - `writer` - prepend notes to a changelog file

pub mod render;
pub mod sections;
pub mod writer;

pub use render::ReleaseNotes;
pub use sections::{
    assemble_sections, collect_breaking_notes, ChangelogEntry, ChangelogSection, SectionMapping,
};
pub use writer::prepend_changelog;

use crate::domain::{LastRelease, NextRelease, ParsedCommit};
use chrono::NaiveDate;

/// Build the notes of `next` from the commits of the release range
pub fn build_release_notes(
    mappings: &[SectionMapping],
    commits: &[ParsedCommit],
    next: &NextRelease,
    last: Option<&LastRelease>,
    repository_url: Option<&str>,
    date: NaiveDate,
) -> ReleaseNotes {
    ReleaseNotes {
        version: next.version.to_string(),
        git_tag: next.git_tag.clone(),
        previous_tag: last.map(|l| l.git_tag.clone()),
        date,
        repository_url: repository_url.map(str::to_string),
        breaking: collect_breaking_notes(commits),
        sections: assemble_sections(mappings, commits),
    }
}
