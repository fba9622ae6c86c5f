//! Formatting functions for terminal output.
//!
//! `format_*` functions build the text, `display_*` functions print it.

use console::style;

use crate::analyzer::Analysis;
use crate::boundary::BoundaryWarning;
use crate::domain::{BranchRule, LastRelease, NextRelease, ReleaseLevel};

const MAX_LISTED_COMMITS: usize = 20;

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
}

fn styled_level(level: ReleaseLevel, width: usize) -> String {
    let text = format!("{:<width$}", level.as_str());
    match level {
        ReleaseLevel::Major => style(text).red().bold().to_string(),
        ReleaseLevel::Minor => style(text).green().to_string(),
        ReleaseLevel::Patch => style(text).cyan().to_string(),
        ReleaseLevel::None => style(text).dim().to_string(),
    }
}

/// One line per commit (level, short hash, header), capped at
/// [`MAX_LISTED_COMMITS`] lines.
pub fn format_analysis(analysis: &Analysis, branch: &str) -> Vec<String> {
    let mut lines = vec![style(format!(
        "Analyzing {} commit(s) on branch '{}'",
        analysis.commits.len(),
        branch
    ))
    .bold()
    .to_string()];

    for classified in analysis.commits.iter().take(MAX_LISTED_COMMITS) {
        let commit = &classified.commit;
        let header = match (&commit.r#type, &commit.scope) {
            (Some(t), Some(s)) => format!("{}({}): {}", t, s, commit.subject),
            (Some(t), None) => format!("{}: {}", t, commit.subject),
            (None, _) => commit.subject.clone(),
        };
        lines.push(format!(
            "  {} {} {}",
            styled_level(classified.level, 5),
            style(commit.short_hash()).dim(),
            header
        ));
    }

    if analysis.commits.len() > MAX_LISTED_COMMITS {
        lines.push(format!(
            "  ... and {} more commits",
            analysis.commits.len() - MAX_LISTED_COMMITS
        ));
    }

    lines.push(format!("Release type: {}", styled_level(analysis.level, 0)));
    lines
}

pub fn display_analysis(analysis: &Analysis, branch: &str) {
    for line in format_analysis(analysis, branch) {
        println!("{}", line);
    }
}

/// Transition from the last release to the next one
pub fn format_next_release(last: Option<&LastRelease>, next: &NextRelease) -> Vec<String> {
    let mut lines = Vec::new();
    match last {
        Some(last) => {
            lines.push(style("Next release:").bold().to_string());
            lines.push(format!("  From: {}", style(&last.git_tag).red()));
            lines.push(format!("  To:   {}", style(&next.git_tag).green().bold()));
        }
        None => {
            lines.push(style("Initial release:").bold().to_string());
            lines.push(format!(
                "  New tag: {}",
                style(&next.git_tag).green().bold()
            ));
        }
    }
    if let Some(channel) = &next.channel {
        lines.push(format!("  Channel: {}", style(channel).yellow()));
    }
    lines
}

pub fn display_next_release(last: Option<&LastRelease>, next: &NextRelease) {
    println!();
    for line in format_next_release(last, next) {
        println!("{}", line);
    }
}

pub fn format_branches(rules: &[BranchRule]) -> Vec<String> {
    let mut lines = vec![style("Configured branches:").bold().to_string()];
    for rule in rules {
        let line = match (&rule.prerelease, rule.channel()) {
            (Some(label), Some(channel)) => format!(
                "  - {} (prerelease: {}, channel: {})",
                rule.name, label, channel
            ),
            (None, Some(channel)) => format!("  - {} (channel: {})", rule.name, channel),
            _ => format!("  - {}", rule.name),
        };
        lines.push(line);
    }
    lines
}

pub fn display_branches(rules: &[BranchRule]) {
    for line in format_branches(rules) {
        println!("{}", line);
    }
}
