//! Configuration loading and validation
//!
//! Native configuration lives in `gitrelease.toml`. A semantic-release style
//! `.releaserc.json` (`branches` + `plugins`) is understood as well, see
//! [`releaserc`].

pub mod releaserc;

use crate::changelog::SectionMapping;
use crate::domain::{
    parse_version, BranchRule, BranchSet, CommitParser, ReleaseLevel, ReleaseRule, TagFormat,
};
use crate::error::{ReleaseError, Result};
use crate::notify::Notifier;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names searched in the working directory, in order
pub const LOCAL_CONFIG_FILES: [&str; 2] = ["gitrelease.toml", ".releaserc.json"];

/// Complete configuration for git-release.
///
/// Every table is ordered: branches, release rules and changelog sections are
/// evaluated in declaration order.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_branches")]
    pub branches: Vec<BranchRule>,

    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    /// Version of the very first release of a branch
    #[serde(default = "default_initial_version")]
    pub initial_version: String,

    /// Web URL of the repository, used for links in release notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default = "default_release_rules")]
    pub release_rules: Vec<ReleaseRule>,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

fn default_branches() -> Vec<BranchRule> {
    vec![
        BranchRule::new("main"),
        BranchRule::prerelease("develop", "beta"),
    ]
}

fn default_tag_format() -> String {
    "v${version}".to_string()
}

fn default_initial_version() -> String {
    "1.0.0".to_string()
}

/// The breaking rule comes first so it wins over every type rule
pub fn default_release_rules() -> Vec<ReleaseRule> {
    vec![
        ReleaseRule::breaking(ReleaseLevel::Major),
        ReleaseRule::for_type("feat", ReleaseLevel::Minor),
        ReleaseRule::for_type("fix", ReleaseLevel::Patch),
        ReleaseRule::for_type("perf", ReleaseLevel::Patch),
        ReleaseRule::for_type("revert", ReleaseLevel::Patch),
        ReleaseRule::for_type("docs", ReleaseLevel::Patch).with_scope("README"),
        ReleaseRule::for_type("style", ReleaseLevel::None),
        ReleaseRule::for_type("chore", ReleaseLevel::None),
        ReleaseRule::for_type("refactor", ReleaseLevel::None),
        ReleaseRule::for_type("test", ReleaseLevel::None),
        ReleaseRule::for_type("build", ReleaseLevel::None),
        ReleaseRule::for_type("ci", ReleaseLevel::None),
    ]
}

/// Commit message parser options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParserConfig {
    #[serde(default = "default_note_keywords")]
    pub note_keywords: Vec<String>,
}

fn default_note_keywords() -> Vec<String> {
    vec![
        "BREAKING CHANGE".to_string(),
        "BREAKING CHANGES".to_string(),
        "BREAKING".to_string(),
    ]
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            note_keywords: default_note_keywords(),
        }
    }
}

/// Changelog section mapping, rendered in declaration order
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionMapping>,
}

fn default_sections() -> Vec<SectionMapping> {
    vec![
        SectionMapping::new("feat", "Features"),
        SectionMapping::new("fix", "Bug Fixes"),
        SectionMapping::new("perf", "Performance Improvements"),
        SectionMapping::new("revert", "Reverts"),
        SectionMapping::new("docs", "Documentation"),
        SectionMapping::hidden("style", "Styles"),
        SectionMapping::hidden("chore", "Chores"),
        SectionMapping::hidden("refactor", "Code Refactoring"),
        SectionMapping::hidden("test", "Tests"),
        SectionMapping::hidden("build", "Build System"),
        SectionMapping::hidden("ci", "Continuous Integration"),
    ]
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            sections: default_sections(),
        }
    }
}

/// Notification templates and transport.
///
/// An empty template disables that notification.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "default_success_template")]
    pub success: String,

    #[serde(default = "default_failure_template")]
    pub failure: String,

    /// External command receiving the rendered body on stdin.
    /// Notifications are printed to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

fn default_success_template() -> String {
    "This PR is included in version [${nextRelease.version}](${nextRelease.gitTag}) which has been released! \
The release is available on:\n\
- [GitHub Releases](${nextRelease.gitTag})\n\
- [Container Registry](https://gallery.ecr.aws/liatrio-demo/api:v${nextRelease.version})\n\n\
Your changes are now live!"
        .to_string()
}

fn default_failure_template() -> String {
    "The release process failed. Please check the \
[build logs](${env.GITHUB_SERVER_URL}/${env.GITHUB_REPOSITORY}/actions/runs/${env.GITHUB_RUN_ID}) \
for more information."
        .to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            success: default_success_template(),
            failure: default_failure_template(),
            command: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branches: default_branches(),
            tag_format: default_tag_format(),
            initial_version: default_initial_version(),
            repository_url: None,
            parser: ParserConfig::default(),
            release_rules: default_release_rules(),
            changelog: ChangelogConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file; `.json` files and `.releaserc*` files are
    /// read as semantic-release configuration, everything else as TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let is_releaserc = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(".releaserc"));
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");

        if is_json || is_releaserc {
            debug!(path = %path.display(), "reading semantic-release configuration");
            releaserc::from_json_str(&content)
        } else {
            debug!(path = %path.display(), "reading TOML configuration");
            Config::from_toml_str(&content)
        }
    }

    /// Check the invariants every consumer relies on
    pub fn validate(&self) -> Result<()> {
        self.branch_set()?;
        self.tag_format()?;
        self.initial_version()?;
        self.commit_parser()?;

        for rule in &self.release_rules {
            rule.validate()?;
        }

        let mut seen = HashSet::new();
        for section in &self.changelog.sections {
            if !seen.insert(section.r#type.as_str()) {
                return Err(ReleaseError::config(format!(
                    "Changelog type '{}' is mapped more than once",
                    section.r#type
                )));
            }
        }

        Notifier::new(&self.notifications)?;

        if let Some(command) = &self.notifications.command {
            if command.is_empty() {
                return Err(ReleaseError::config(
                    "notifications.command must name a program",
                ));
            }
        }

        Ok(())
    }

    pub fn branch_set(&self) -> Result<BranchSet<'_>> {
        BranchSet::new(&self.branches)
    }

    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(self.tag_format.as_str()).map_err(|e| ReleaseError::config(e.to_string()))
    }

    pub fn initial_version(&self) -> Result<Version> {
        let version = parse_version(&self.initial_version)
            .map_err(|e| ReleaseError::config(e.to_string()))?;
        if !version.pre.is_empty() {
            return Err(ReleaseError::config(format!(
                "initial_version '{}' must not be a prerelease",
                self.initial_version
            )));
        }
        Ok(version)
    }

    pub fn commit_parser(&self) -> Result<CommitParser> {
        CommitParser::new(&self.parser.note_keywords)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Search order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in the current directory
/// 3. `.releaserc.json` in the current directory
/// 4. `gitrelease.toml` in the user config directory
/// 5. Built-in defaults
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err` - If a file exists but cannot be read, parsed, or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    match locate_config(config_path) {
        Some(path) => Config::from_file(&path),
        None => {
            debug!("no configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn locate_config(config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(PathBuf::from(path));
    }

    if let Some(local) = LOCAL_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("gitrelease.toml"))
        .filter(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_rules_start_with_breaking() {
        let rules = default_release_rules();
        assert_eq!(rules[0], ReleaseRule::breaking(ReleaseLevel::Major));
        assert_eq!(rules.len(), 12);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("tag_format = \"api-${version}\"").unwrap();
        assert_eq!(config.tag_format, "api-${version}");
        assert_eq!(config.branches, default_branches());
        assert_eq!(config.release_rules, default_release_rules());
    }

    #[test]
    fn test_duplicate_branch_rejected() {
        let err = Config::from_toml_str("branches = [\"main\", \"main\"]").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_bad_tag_format_rejected() {
        assert!(Config::from_toml_str("tag_format = \"v{version}\"").is_err());
    }

    #[test]
    fn test_prerelease_initial_version_rejected() {
        assert!(Config::from_toml_str("initial_version = \"1.0.0-rc.1\"").is_err());
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let content = r#"
[[changelog.sections]]
type = "feat"
section = "Features"

[[changelog.sections]]
type = "feat"
section = "New Stuff"
"#;
        assert!(Config::from_toml_str(content).is_err());
    }

    #[test]
    fn test_unterminated_template_rejected() {
        let content = "[notifications]\nsuccess = \"released ${nextRelease.version\"";
        assert!(Config::from_toml_str(content).is_err());
    }

    #[test]
    fn test_unknown_placeholder_rejected_at_load() {
        let content = "[notifications]\nsuccess = \"released ${nextRelease.notes}\"";
        let err = Config::from_toml_str(content).unwrap_err();
        assert!(
            err.to_string().contains("Unknown placeholder"),
            "got: {}",
            err
        );

        let content = "[notifications]\nfailure = \"${nextRelease.gitTag} failed\"";
        assert!(Config::from_toml_str(content).is_err());
    }
}
