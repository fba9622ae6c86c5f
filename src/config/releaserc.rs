//! semantic-release configuration import
//!
//! Reads the `branches` + `plugins` shape of a `.releaserc.json` and maps the
//! options of the plugins this crate understands onto [`Config`]. Anything
//! not mentioned keeps its built-in default.

use super::Config;
use crate::changelog::SectionMapping;
use crate::domain::{BranchRule, ReleaseRule};
use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use tracing::debug;

pub const COMMIT_ANALYZER: &str = "@semantic-release/commit-analyzer";
pub const NOTES_GENERATOR: &str = "@semantic-release/release-notes-generator";
pub const GITHUB: &str = "@semantic-release/github";

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReleaseRc {
    #[serde(default)]
    branches: Option<Vec<BranchRule>>,
    #[serde(default)]
    tag_format: Option<String>,
    #[serde(default)]
    repository_url: Option<String>,
    #[serde(default)]
    plugins: Vec<PluginEntry>,
}

/// A plugin is either a bare identifier or an `[identifier, options]` pair
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PluginEntry {
    Name(String),
    WithOptions(String, serde_json::Value),
}

impl PluginEntry {
    fn name(&self) -> &str {
        match self {
            PluginEntry::Name(name) | PluginEntry::WithOptions(name, _) => name,
        }
    }

    fn options(&self) -> Option<&serde_json::Value> {
        match self {
            PluginEntry::Name(_) => None,
            PluginEntry::WithOptions(_, options) => Some(options),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CommitAnalyzerOptions {
    #[serde(default)]
    release_rules: Option<Vec<ReleaseRule>>,
    #[serde(default)]
    parser_opts: Option<ParserOpts>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ParserOpts {
    #[serde(default)]
    note_keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NotesGeneratorOptions {
    #[serde(default)]
    preset_config: Option<PresetConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct PresetConfig {
    #[serde(default)]
    types: Option<Vec<SectionMapping>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GithubOptions {
    #[serde(default)]
    success_comment: Option<Comment>,
    #[serde(default)]
    fail_comment: Option<Comment>,
}

/// Comments are templates, or `false` to disable them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Comment {
    Template(String),
    Enabled(bool),
}

impl Comment {
    fn into_template(self, default: String) -> String {
        match self {
            Comment::Template(text) => text,
            Comment::Enabled(true) => default,
            Comment::Enabled(false) => String::new(),
        }
    }
}

/// Parse a `.releaserc.json` document into a validated [`Config`]
pub fn from_json_str(content: &str) -> Result<Config> {
    let rc: ReleaseRc = serde_json::from_str(content)?;
    let config = apply(rc)?;
    config.validate()?;
    Ok(config)
}

fn apply(rc: ReleaseRc) -> Result<Config> {
    let mut config = Config::default();

    if let Some(branches) = rc.branches {
        config.branches = branches;
    }
    if let Some(tag_format) = rc.tag_format {
        config.tag_format = tag_format;
    }
    config.repository_url = rc.repository_url.map(|url| normalize_repository_url(&url));

    for plugin in &rc.plugins {
        match plugin.name() {
            COMMIT_ANALYZER => {
                let options: CommitAnalyzerOptions = plugin_options(plugin)?;
                if let Some(rules) = options.release_rules {
                    config.release_rules = rules;
                }
                if let Some(keywords) = options.parser_opts.and_then(|p| p.note_keywords) {
                    config.parser.note_keywords = keywords;
                }
            }
            NOTES_GENERATOR => {
                let options: NotesGeneratorOptions = plugin_options(plugin)?;
                if let Some(types) = options.preset_config.and_then(|p| p.types) {
                    config.changelog.sections = types;
                }
            }
            GITHUB => {
                let options: GithubOptions = plugin_options(plugin)?;
                let defaults = config.notifications.clone();
                if let Some(success) = options.success_comment {
                    config.notifications.success = success.into_template(defaults.success);
                }
                if let Some(failure) = options.fail_comment {
                    config.notifications.failure = failure.into_template(defaults.failure);
                }
            }
            other => debug!(plugin = other, "ignoring plugin without a local equivalent"),
        }
    }

    Ok(config)
}

fn plugin_options<T>(plugin: &PluginEntry) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match plugin.options() {
        Some(value) => T::deserialize(value).map_err(|e| {
            ReleaseError::config(format!("Invalid options for {}: {}", plugin.name(), e))
        }),
        None => Ok(T::default()),
    }
}

/// Turn `git+https://host/org/repo.git` style URLs into browsable ones
fn normalize_repository_url(url: &str) -> String {
    let url = url.trim().trim_start_matches("git+");
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReleaseLevel;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_plugins_are_mapped() {
        let content = r#"{
            "branches": ["trunk", {"name": "next", "prerelease": "rc"}],
            "tagFormat": "api-${version}",
            "plugins": [
                ["@semantic-release/commit-analyzer", {
                    "preset": "angular",
                    "releaseRules": [
                        {"breaking": true, "release": "major"},
                        {"type": "docs", "release": false}
                    ],
                    "parserOpts": {"noteKeywords": ["BREAKING"]}
                }],
                ["@semantic-release/release-notes-generator", {
                    "presetConfig": {"types": [{"type": "feat", "section": "New"}]}
                }],
                ["@semantic-release/npm", {"npmPublish": false}],
                ["@semantic-release/github", {"successComment": false, "failComment": "failed ${env.GITHUB_RUN_ID}"}]
            ]
        }"#;

        let config = from_json_str(content).unwrap();
        assert_eq!(config.branches[0], BranchRule::new("trunk"));
        assert_eq!(config.branches[1], BranchRule::prerelease("next", "rc"));
        assert_eq!(config.tag_format, "api-${version}");
        assert_eq!(config.release_rules.len(), 2);
        assert_eq!(config.release_rules[1].release, ReleaseLevel::None);
        assert_eq!(config.parser.note_keywords, vec!["BREAKING".to_string()]);
        assert_eq!(config.changelog.sections.len(), 1);
        assert_eq!(config.changelog.sections[0].section, "New");
        assert!(config.notifications.success.is_empty());
        assert_eq!(config.notifications.failure, "failed ${env.GITHUB_RUN_ID}");
    }

    #[test]
    fn test_bare_plugin_name_keeps_defaults() {
        let content = r#"{"plugins": ["@semantic-release/commit-analyzer"]}"#;
        let config = from_json_str(content).unwrap();
        assert_eq!(config.release_rules, Config::default().release_rules);
    }

    #[test]
    fn test_invalid_plugin_options() {
        let content = r#"{"plugins": [["@semantic-release/commit-analyzer", {"releaseRules": [{"type": "feat", "release": "huge"}]}]]}"#;
        let err = from_json_str(content).unwrap_err();
        assert!(err.to_string().contains("commit-analyzer"));
    }

    #[test]
    fn test_repository_url_normalized() {
        let content = r#"{"repositoryUrl": "git+https://github.com/acme/api.git"}"#;
        let config = from_json_str(content).unwrap();
        assert_eq!(
            config.repository_url.as_deref(),
            Some("https://github.com/acme/api")
        );
    }
}
