use super::sections::{ChangelogEntry, ChangelogSection};
use chrono::NaiveDate;
use std::fmt::Write;

pub const BREAKING_TITLE: &str = "⚠ BREAKING CHANGES";

/// Release notes for one version, ready to render as markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotes {
    pub version: String,
    pub git_tag: String,
    pub previous_tag: Option<String>,
    pub date: NaiveDate,
    pub repository_url: Option<String>,
    pub breaking: Vec<ChangelogEntry>,
    pub sections: Vec<ChangelogSection>,
}

impl ReleaseNotes {
    pub fn is_empty(&self) -> bool {
        self.breaking.is_empty() && self.sections.is_empty()
    }

    /// Render in the angular changelog style
    pub fn render(&self) -> String {
        let mut out = String::new();

        let date = self.date.format("%Y-%m-%d");
        let _ = writeln!(out, "## {} ({})", self.heading(), date);

        if !self.breaking.is_empty() {
            let _ = write!(out, "\n### {}\n\n", BREAKING_TITLE);
            for entry in &self.breaking {
                let _ = writeln!(out, "{}", self.entry_line(entry));
            }
        }

        for section in &self.sections {
            let _ = write!(out, "\n### {}\n\n", section.title);
            for entry in &section.entries {
                let _ = writeln!(out, "{}", self.entry_line(entry));
            }
        }

        out
    }

    fn heading(&self) -> String {
        match (&self.repository_url, &self.previous_tag) {
            (Some(url), Some(previous)) => format!(
                "[{}]({}/compare/{}...{})",
                self.version, url, previous, self.git_tag
            ),
            (Some(url), None) => {
                format!("[{}]({}/releases/tag/{})", self.version, url, self.git_tag)
            }
            (None, _) => self.version.clone(),
        }
    }

    fn entry_line(&self, entry: &ChangelogEntry) -> String {
        let short: String = entry.hash.chars().take(7).collect();
        let reference = match &self.repository_url {
            Some(url) => format!("([{}]({}/commit/{}))", short, url, entry.hash),
            None => format!("({})", short),
        };

        match &entry.scope {
            Some(scope) => format!("* **{}:** {} {}", scope, entry.subject, reference),
            None => format!("* {} {}", entry.subject, reference),
        }
    }
}
