//! Write rendered release notes to a changelog file.

use crate::error::{ReleaseError, Result};
use std::fs;
use std::path::Path;

pub const CHANGELOG_HEADER: &str = "# Changelog\n\n";

/// Prepend `rendered` to the changelog at `path`.
///
/// Creates the file with a header when missing. An existing top-level
/// `# ` header stays on top and the new notes go right below it.
pub fn prepend_changelog(path: &Path, rendered: &str) -> Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(ReleaseError::Io(e));
        }
    };

    let content = match existing {
        None => format!("{}{}", CHANGELOG_HEADER, rendered),
        Some(existing) => insert_after_header(&existing, rendered),
    };

    fs::write(path, content)?;
    Ok(())
}

fn insert_after_header(existing: &str, rendered: &str) -> String {
    let insertion = if existing.starts_with("# ") {
        // Skip the title line and the blank lines after it
        let after_title = existing.find('\n').map_or(existing.len(), |i| i + 1);
        let rest = &existing[after_title..];
        after_title + (rest.len() - rest.trim_start_matches('\n').len())
    } else {
        0
    };

    let mut content = String::with_capacity(existing.len() + rendered.len() + 1);
    content.push_str(&existing[..insertion]);
    if insertion > 0 && !content.ends_with("\n\n") {
        content.push('\n');
    }
    content.push_str(rendered);
    if insertion < existing.len() {
        content.push('\n');
        content.push_str(&existing[insertion..]);
    }
    content
}
