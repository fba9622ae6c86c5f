use crate::error::{ReleaseError, Result};
use regex::Regex;

/// Parsed representation of a commit message
///
/// `type` is `None` for commits that do not follow the conventional format.
/// Such commits only match rules that do not constrain type or scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub hash: String,
    pub r#type: Option<String>,
    pub scope: Option<String>,
    pub subject: String,
    pub body: Option<String>,
    pub is_breaking_change: bool,
    /// Text of breaking-change notes found in the body
    pub notes: Vec<String>,
}

impl ParsedCommit {
    /// Short form of the commit hash used in changelogs
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }

    pub fn is_conventional(&self) -> bool {
        self.r#type.is_some()
    }
}

/// Parser for conventional commit messages
///
/// Supports headers of the forms:
/// - type(scope)!: subject
/// - type(scope): subject
/// - type!: subject
/// - type: subject
/// - Revert "original header"
///
/// A body or footer line starting with one of the note keywords followed by
/// a colon marks the commit as breaking.
#[derive(Debug, Clone)]
pub struct CommitParser {
    header: Regex,
    revert: Regex,
    note_keywords: Vec<String>,
}

impl CommitParser {
    pub fn new(note_keywords: &[String]) -> Result<Self> {
        let header = Regex::new(r"^([A-Za-z]+)(?:\(([^)]*)\))?(!)?:\s*(.+)$")
            .map_err(|e| ReleaseError::config(format!("Invalid header pattern: {}", e)))?;
        let revert = Regex::new(r#"^Revert\s+"(.+)"$"#)
            .map_err(|e| ReleaseError::config(format!("Invalid revert pattern: {}", e)))?;

        if let Some(empty) = note_keywords.iter().find(|k| k.trim().is_empty()) {
            return Err(ReleaseError::config(format!(
                "Note keywords must not be blank (got {:?})",
                empty
            )));
        }

        Ok(CommitParser {
            header,
            revert,
            note_keywords: note_keywords.to_vec(),
        })
    }

    pub fn parse(&self, hash: &str, message: &str) -> ParsedCommit {
        let message = message.trim();
        let (header, rest) = match message.split_once('\n') {
            Some((header, rest)) => (header.trim(), Some(rest.trim())),
            None => (message, None),
        };
        let body = rest.filter(|b| !b.is_empty()).map(str::to_string);
        let notes = body
            .as_deref()
            .map(|b| self.extract_notes(b))
            .unwrap_or_default();

        if let Some(captures) = self.header.captures(header) {
            let r#type = captures.get(1).map(|m| m.as_str().to_string());
            let scope = captures
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let has_bang = captures.get(3).is_some();
            let subject = captures
                .get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            return ParsedCommit {
                hash: hash.to_string(),
                r#type,
                scope,
                subject,
                body,
                is_breaking_change: has_bang || !notes.is_empty(),
                notes,
            };
        }

        if let Some(captures) = self.revert.captures(header) {
            let subject = captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            return ParsedCommit {
                hash: hash.to_string(),
                r#type: Some("revert".to_string()),
                scope: None,
                subject,
                body,
                is_breaking_change: !notes.is_empty(),
                notes,
            };
        }

        ParsedCommit {
            hash: hash.to_string(),
            r#type: None,
            scope: None,
            subject: header.to_string(),
            body,
            is_breaking_change: !notes.is_empty(),
            notes,
        }
    }

    /// Collect breaking-change notes. A note runs until the next blank line.
    fn extract_notes(&self, body: &str) -> Vec<String> {
        let mut notes = Vec::new();
        let mut current: Option<String> = None;

        for line in body.lines() {
            let trimmed = line.trim();
            if let Some(text) = self.note_text(trimmed) {
                if let Some(done) = current.take() {
                    notes.push(done);
                }
                current = Some(text.to_string());
            } else if trimmed.is_empty() {
                if let Some(done) = current.take() {
                    notes.push(done);
                }
            } else if let Some(note) = current.as_mut() {
                note.push(' ');
                note.push_str(trimmed);
            }
        }

        if let Some(done) = current {
            notes.push(done);
        }
        notes
    }

    fn note_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.note_keywords.iter().find_map(|keyword| {
            line.strip_prefix(keyword.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::trim)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommitParser {
        CommitParser::new(&[
            "BREAKING CHANGE".to_string(),
            "BREAKING CHANGES".to_string(),
            "BREAKING".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_with_scope() {
        let commit = parser().parse("abc", "feat(auth): add login");
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.scope.as_deref(), Some("auth"));
        assert_eq!(commit.subject, "add login");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_with_breaking_marker() {
        let commit = parser().parse("abc", "feat(auth)!: redesign login");
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert!(commit.is_breaking_change);
        assert!(commit.notes.is_empty());
    }

    #[test]
    fn test_parse_breaking_without_scope() {
        let commit = parser().parse("abc", "refactor!: drop python 3.8");
        assert_eq!(commit.scope, None);
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_note_in_footer() {
        let commit = parser().parse(
            "abc",
            "fix: rename health route\n\nBREAKING CHANGE: /health moved to /healthz\nupdate probes",
        );
        assert!(commit.is_breaking_change);
        assert_eq!(
            commit.notes,
            vec!["/health moved to /healthz update probes"]
        );
    }

    #[test]
    fn test_parse_plural_keyword() {
        let commit = parser().parse("abc", "feat: x\n\nBREAKING CHANGES: many things");
        assert_eq!(commit.notes, vec!["many things"]);
    }

    #[test]
    fn test_keyword_requires_colon() {
        let commit = parser().parse("abc", "docs: explain\n\nBREAKING news is not a note");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_empty_scope_is_none() {
        let commit = parser().parse("abc", "fix(): tidy");
        assert_eq!(commit.scope, None);
        assert_eq!(commit.r#type.as_deref(), Some("fix"));
    }

    #[test]
    fn test_parse_revert_header() {
        let commit = parser().parse("abc", "Revert \"feat: add metrics endpoint\"");
        assert_eq!(commit.r#type.as_deref(), Some("revert"));
        assert_eq!(commit.subject, "feat: add metrics endpoint");
    }

    #[test]
    fn test_unquoted_revert_is_non_conventional() {
        for header in ["Revert changes to the copy", "revert the logo tweak"] {
            let commit = parser().parse("abc", header);
            assert_eq!(commit.r#type, None, "{}", header);
            assert_eq!(commit.subject, header);
        }
    }

    #[test]
    fn test_type_token_is_alphabetic() {
        for header in ["v2: bump", "2024_q1: notes"] {
            let commit = parser().parse("abc", header);
            assert!(!commit.is_conventional(), "{}", header);
        }
        let commit = parser().parse("abc", "revert: undo cache change");
        assert_eq!(commit.r#type.as_deref(), Some("revert"));
    }

    #[test]
    fn test_parse_non_conventional() {
        let commit = parser().parse("abc", "Merge branch 'main' into develop");
        assert_eq!(commit.r#type, None);
        assert!(!commit.is_conventional());
        assert_eq!(commit.subject, "Merge branch 'main' into develop");
    }

    #[test]
    fn test_short_hash() {
        let commit = parser().parse("0123456789abcdef", "fix: x");
        assert_eq!(commit.short_hash(), "0123456");
        let short = parser().parse("abc", "fix: x");
        assert_eq!(short.short_hash(), "abc");
    }

    #[test]
    fn test_blank_keyword_rejected() {
        assert!(CommitParser::new(&["  ".to_string()]).is_err());
    }
}
