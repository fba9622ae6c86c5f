use crate::domain::{LastRelease, NextRelease};
use crate::error::{ReleaseError, Result};
use std::collections::HashMap;
use tracing::warn;

const NEXT_RELEASE_KEYS: &[&str] = &["version", "gitTag", "type", "channel"];
const LAST_RELEASE_KEYS: &[&str] = &["version", "gitTag"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// Notification template with `${path}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                ReleaseError::template(format!(
                    "Unterminated placeholder starting at '{}'",
                    &rest[start..]
                ))
            })?;
            let path = after[..end].trim();
            if path.is_empty() {
                return Err(ReleaseError::template("Empty placeholder '${}'"));
            }
            segments.push(Segment::Placeholder(path.to_string()));
            rest = &after[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Template { segments })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(path) => Some(path.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Reject placeholders that can never resolve. `nextRelease.*` is
    /// rejected unless the template renders for a successful release.
    pub fn check_placeholders(&self, with_next_release: bool) -> Result<()> {
        self.placeholders()
            .try_for_each(|path| check_path(path, with_next_release))
    }

    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(path) => out.push_str(&context.resolve(path)?),
            }
        }
        Ok(out)
    }
}

/// Values available to templates at release time
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    next_release: Option<NextRelease>,
    last_release: Option<LastRelease>,
    branch: Option<String>,
    env: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next_release(mut self, next: NextRelease) -> Self {
        self.next_release = Some(next);
        self
    }

    pub fn with_last_release(mut self, last: Option<LastRelease>) -> Self {
        self.last_release = last;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Snapshot of the current process environment
    pub fn with_process_env(self) -> Self {
        self.with_env(std::env::vars())
    }

    /// Resolve a dotted placeholder path such as `nextRelease.version`
    pub fn resolve(&self, path: &str) -> Result<String> {
        let (root, key) = path.split_once('.').ok_or_else(|| unknown(path))?;

        match root {
            "nextRelease" => {
                let next = self
                    .next_release
                    .as_ref()
                    .ok_or_else(|| next_release_unavailable(path))?;
                match key {
                    "version" => Ok(next.version.to_string()),
                    "gitTag" => Ok(next.git_tag.clone()),
                    "type" => Ok(next.level.to_string()),
                    "channel" => Ok(next.channel.clone().unwrap_or_default()),
                    _ => Err(unknown(path)),
                }
            }
            "lastRelease" => {
                let last = self.last_release.as_ref();
                match key {
                    "version" => Ok(last.map(|l| l.version.to_string()).unwrap_or_default()),
                    "gitTag" => Ok(last.map(|l| l.git_tag.clone()).unwrap_or_default()),
                    _ => Err(unknown(path)),
                }
            }
            "branch" if key == "name" => Ok(self.branch.clone().unwrap_or_default()),
            "env" => match self.env.get(key) {
                Some(value) => Ok(value.clone()),
                None => {
                    warn!(
                        variable = key,
                        "environment variable not set, rendering empty"
                    );
                    Ok(String::new())
                }
            },
            _ => Err(unknown(path)),
        }
    }
}

fn check_path(path: &str, with_next_release: bool) -> Result<()> {
    let (root, key) = path.split_once('.').ok_or_else(|| unknown(path))?;
    let known = match root {
        "nextRelease" if !with_next_release => return Err(next_release_unavailable(path)),
        "nextRelease" => NEXT_RELEASE_KEYS.contains(&key),
        "lastRelease" => LAST_RELEASE_KEYS.contains(&key),
        "branch" => key == "name",
        "env" => !key.is_empty(),
        _ => false,
    };
    if known {
        Ok(())
    } else {
        Err(unknown(path))
    }
}

fn next_release_unavailable(path: &str) -> ReleaseError {
    ReleaseError::template(format!(
        "'{}' is only available for successful releases",
        path
    ))
}

fn unknown(path: &str) -> ReleaseError {
    ReleaseError::template(format!("Unknown placeholder '${{{}}}'", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReleaseLevel;
    use semver::Version;

    fn next() -> NextRelease {
        NextRelease {
            version: Version::new(1, 3, 0),
            git_tag: "v1.3.0".to_string(),
            level: ReleaseLevel::Minor,
            channel: None,
        }
    }

    #[test]
    fn test_parse_segments() {
        let template = Template::parse("v${nextRelease.version} on ${ branch.name }").unwrap();
        let placeholders: Vec<_> = template.placeholders().collect();
        assert_eq!(placeholders, vec!["nextRelease.version", "branch.name"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Template::parse("${nextRelease.version").is_err());
        assert!(Template::parse("${}").is_err());
    }

    #[test]
    fn test_plain_text_and_dollar_signs() {
        let template = Template::parse("costs $5 {not a placeholder}").unwrap();
        let rendered = template.render(&TemplateContext::new()).unwrap();
        assert_eq!(rendered, "costs $5 {not a placeholder}");
    }

    #[test]
    fn test_render_next_release() {
        let source = "[${nextRelease.version}](${nextRelease.gitTag}) ${nextRelease.type}";
        let template = Template::parse(source).unwrap();
        let context = TemplateContext::new().with_next_release(next());
        assert_eq!(template.render(&context).unwrap(), "[1.3.0](v1.3.0) minor");
    }

    #[test]
    fn test_next_release_missing_on_failure() {
        let template = Template::parse("${nextRelease.version}").unwrap();
        let err = template.render(&TemplateContext::new()).unwrap_err();
        assert!(err.to_string().contains("only available"));
    }

    #[test]
    fn test_render_env() {
        let template = Template::parse("${env.GITHUB_REPOSITORY}/runs/${env.GITHUB_RUN_ID}").unwrap();
        let context = TemplateContext::new().with_env([
            ("GITHUB_REPOSITORY", "acme/api"),
            ("GITHUB_RUN_ID", "42"),
        ]);
        assert_eq!(template.render(&context).unwrap(), "acme/api/runs/42");
    }

    #[test]
    fn test_missing_env_renders_empty() {
        let template = Template::parse("run ${env.NOT_SET_ANYWHERE}!").unwrap();
        assert_eq!(template.render(&TemplateContext::new()).unwrap(), "run !");
    }

    #[test]
    fn test_unknown_placeholder() {
        let template = Template::parse("${nextRelease.notes}").unwrap();
        let context = TemplateContext::new().with_next_release(next());
        assert!(template.render(&context).is_err());
        assert!(TemplateContext::new().resolve("options").is_err());
    }

    #[test]
    fn test_check_placeholders() {
        let success = Template::parse(
            "${nextRelease.gitTag} after ${lastRelease.version} on ${branch.name} ${env.CI}",
        )
        .unwrap();
        assert!(success.check_placeholders(true).is_ok());

        let err = success.check_placeholders(false).unwrap_err();
        assert!(err.to_string().contains("only available"));

        for source in [
            "${nextRelease.notes}",
            "${lastRelease.channel}",
            "${branch}",
            "${options.x}",
        ] {
            let template = Template::parse(source).unwrap();
            let err = template.check_placeholders(true).unwrap_err();
            assert!(
                err.to_string().contains("Unknown placeholder"),
                "{}",
                source
            );
        }
    }

    #[test]
    fn test_last_release_empty_on_first_release() {
        let context = TemplateContext::new();
        assert_eq!(context.resolve("lastRelease.version").unwrap(), "");
    }
}
