use crate::domain::prerelease::PreReleaseType;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A release branch: an exact name or glob pattern, optionally publishing prereleases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBranchRule")]
pub struct BranchRule {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Branches are written either as a bare name or as a table
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBranchRule {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        prerelease: Option<RawPrerelease>,
        #[serde(default)]
        channel: Option<String>,
    },
}

/// `prerelease = true` uses the branch name as the label
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrerelease {
    Flag(bool),
    Label(String),
}

impl From<RawBranchRule> for BranchRule {
    fn from(raw: RawBranchRule) -> Self {
        match raw {
            RawBranchRule::Name(name) => BranchRule::new(name),
            RawBranchRule::Detailed {
                name,
                prerelease,
                channel,
            } => {
                let prerelease = match prerelease {
                    Some(RawPrerelease::Label(label)) => Some(label),
                    Some(RawPrerelease::Flag(true)) => Some(name.clone()),
                    Some(RawPrerelease::Flag(false)) | None => None,
                };
                BranchRule {
                    name,
                    prerelease,
                    channel,
                }
            }
        }
    }
}

impl BranchRule {
    pub fn new(name: impl Into<String>) -> Self {
        BranchRule {
            name: name.into(),
            prerelease: None,
            channel: None,
        }
    }

    pub fn prerelease(name: impl Into<String>, label: impl Into<String>) -> Self {
        BranchRule {
            name: name.into(),
            prerelease: Some(label.into()),
            channel: None,
        }
    }

    /// Check whether `branch` is covered by this rule (exact name or glob)
    pub fn matches(&self, branch: &str) -> bool {
        if self.name == branch {
            return true;
        }
        self.name.contains(['*', '?', '['])
            && glob::Pattern::new(&self.name)
                .map(|p| p.matches(branch))
                .unwrap_or(false)
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    pub fn prerelease_type(&self) -> Result<Option<PreReleaseType>> {
        self.prerelease
            .as_deref()
            .map(PreReleaseType::parse)
            .transpose()
    }

    /// Distribution channel; prerelease branches default to their label
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().or(self.prerelease.as_deref())
    }
}

/// Ordered set of branch rules with unique names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSet<'a> {
    rules: &'a [BranchRule],
}

impl<'a> BranchSet<'a> {
    /// Validate and wrap a rule list
    pub fn new(rules: &'a [BranchRule]) -> Result<Self> {
        if rules.is_empty() {
            return Err(ReleaseError::config(
                "At least one release branch is required",
            ));
        }

        let mut seen = HashSet::new();
        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(ReleaseError::config("Branch name must not be empty"));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(ReleaseError::config(format!(
                    "Branch '{}' is configured more than once",
                    rule.name
                )));
            }
            rule.prerelease_type().map_err(|e| {
                ReleaseError::config(format!("Branch '{}': {}", rule.name, e))
            })?;
        }

        Ok(BranchSet { rules })
    }

    /// First rule, in declaration order, that covers `branch`
    pub fn find(&self, branch: &str) -> Option<&'a BranchRule> {
        self.rules.iter().find(|rule| rule.matches(branch))
    }

    pub fn resolve(&self, branch: &str) -> Result<&'a BranchRule> {
        self.find(branch).ok_or_else(|| {
            ReleaseError::branch(format!(
                "Branch '{}' is not configured for releases (configured: {})",
                branch,
                self.names().join(", ")
            ))
        })
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}
