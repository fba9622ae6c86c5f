use crate::domain::commit::ParsedCommit;
use crate::domain::version::ReleaseLevel;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};

/// One entry of the ordered release rule table.
///
/// Every predicate field that is set must match; unset fields match anything.
/// A rule with no predicate at all is rejected by [`ReleaseRule::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breaking: Option<bool>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Exact scope name or glob pattern (`*`, `?`, `[...]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    pub release: ReleaseLevel,
}

impl ReleaseRule {
    pub fn breaking(release: ReleaseLevel) -> Self {
        ReleaseRule {
            breaking: Some(true),
            r#type: None,
            scope: None,
            release,
        }
    }

    pub fn for_type(commit_type: impl Into<String>, release: ReleaseLevel) -> Self {
        ReleaseRule {
            breaking: None,
            r#type: Some(commit_type.into()),
            scope: None,
            release,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn has_predicate(&self) -> bool {
        self.breaking.is_some() || self.r#type.is_some() || self.scope.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.has_predicate() {
            return Err(ReleaseError::config(format!(
                "Release rule '{}' has no breaking, type or scope predicate",
                self
            )));
        }
        if let Some(scope) = &self.scope {
            glob::Pattern::new(scope).map_err(|e| {
                ReleaseError::config(format!("Invalid scope pattern '{}': {}", scope, e))
            })?;
        }
        Ok(())
    }

    pub fn matches(&self, commit: &ParsedCommit) -> bool {
        if let Some(breaking) = self.breaking {
            if commit.is_breaking_change != breaking {
                return false;
            }
        }

        if let Some(expected) = &self.r#type {
            if commit.r#type.as_deref() != Some(expected.as_str()) {
                return false;
            }
        }

        if let Some(pattern) = &self.scope {
            match commit.scope.as_deref() {
                Some(scope) => return scope_matches(pattern, scope),
                None => return false,
            }
        }

        true
    }
}

impl std::fmt::Display for ReleaseRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(breaking) = self.breaking {
            parts.push(format!("breaking={}", breaking));
        }
        if let Some(t) = &self.r#type {
            parts.push(format!("type={}", t));
        }
        if let Some(s) = &self.scope {
            parts.push(format!("scope={}", s));
        }
        if parts.is_empty() {
            parts.push("*".to_string());
        }
        write!(f, "{} -> {}", parts.join(","), self.release)
    }
}

fn scope_matches(pattern: &str, scope: &str) -> bool {
    if pattern == scope {
        return true;
    }
    glob::Pattern::new(pattern)
        .map(|p| p.matches(scope))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(t: Option<&str>, scope: Option<&str>, breaking: bool) -> ParsedCommit {
        ParsedCommit {
            hash: "abc".to_string(),
            r#type: t.map(str::to_string),
            scope: scope.map(str::to_string),
            subject: "subject".to_string(),
            body: None,
            is_breaking_change: breaking,
            notes: Vec::new(),
        }
    }

    #[test]
    fn test_breaking_rule_ignores_type() {
        let rule = ReleaseRule::breaking(ReleaseLevel::Major);
        assert!(rule.matches(&commit(Some("chore"), None, true)));
        assert!(!rule.matches(&commit(Some("feat"), None, false)));
    }

    #[test]
    fn test_type_rule() {
        let rule = ReleaseRule::for_type("feat", ReleaseLevel::Minor);
        assert!(rule.matches(&commit(Some("feat"), Some("api"), false)));
        assert!(!rule.matches(&commit(Some("fix"), None, false)));
        assert!(!rule.matches(&commit(None, None, false)));
    }

    #[test]
    fn test_scope_rule_requires_scope() {
        let rule = ReleaseRule::for_type("docs", ReleaseLevel::Patch).with_scope("README");
        assert!(rule.matches(&commit(Some("docs"), Some("README"), false)));
        assert!(!rule.matches(&commit(Some("docs"), Some("readme"), false)));
        assert!(!rule.matches(&commit(Some("docs"), None, false)));
    }

    #[test]
    fn test_scope_glob() {
        let rule = ReleaseRule::for_type("fix", ReleaseLevel::Patch).with_scope("api-*");
        assert!(rule.matches(&commit(Some("fix"), Some("api-health"), false)));
        assert!(!rule.matches(&commit(Some("fix"), Some("ui"), false)));
    }

    #[test]
    fn test_validate_rejects_empty_predicate() {
        let rule = ReleaseRule {
            breaking: None,
            r#type: None,
            scope: None,
            release: ReleaseLevel::Patch,
        };
        assert!(rule.validate().is_err());
        let breaking = ReleaseRule::breaking(ReleaseLevel::Major);
        assert!(breaking.validate().is_ok());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let rule: ReleaseRule =
            toml::from_str("type = \"docs\"\nscope = \"README\"\nrelease = \"patch\"").unwrap();
        assert_eq!(
            rule,
            ReleaseRule::for_type("docs", ReleaseLevel::Patch).with_scope("README")
        );

        let rule: ReleaseRule = toml::from_str("type = \"ci\"\nrelease = false").unwrap();
        assert_eq!(rule.release, ReleaseLevel::None);
    }

    #[test]
    fn test_display() {
        let rule = ReleaseRule::for_type("docs", ReleaseLevel::Patch).with_scope("README");
        assert_eq!(rule.to_string(), "type=docs,scope=README -> patch");
    }
}
