use crate::error::{ReleaseError, Result};
use regex::Regex;
use semver::Version;

/// Placeholder substituted with the version in a tag format
pub const VERSION_PLACEHOLDER: &str = "${version}";

/// Tag naming format (e.g., "v${version}", "api-${version}")
#[derive(Debug, Clone)]
pub struct TagFormat {
    format: String,
    matcher: Regex,
}

impl TagFormat {
    /// Create a tag format; it must contain `${version}` exactly once
    pub fn new(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        if format.matches(VERSION_PLACEHOLDER).count() != 1 {
            return Err(ReleaseError::tag(format!(
                "Tag format '{}' must contain {} exactly once",
                format, VERSION_PLACEHOLDER
            )));
        }

        // Escape everything, then open a capture where the version goes
        let escaped = regex::escape(&format);
        let pattern = escaped.replace(&regex::escape(VERSION_PLACEHOLDER), r"(.+)");
        let matcher = Regex::new(&format!("^{}$", pattern))
            .map_err(|e| ReleaseError::tag(format!("Invalid tag format '{}': {}", format, e)))?;

        Ok(TagFormat { format, matcher })
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    /// Format a version according to the pattern
    /// Example: format="v${version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        let version = version.to_string();
        self.format.replace(VERSION_PLACEHOLDER, &version)
    }

    /// Extract the version from a tag produced by this format.
    /// Returns `None` when the tag does not follow the format at all and
    /// an error when it does but the version part is not semver.
    pub fn parse(&self, tag: &str) -> Option<Result<Version>> {
        let captures = self.matcher.captures(tag)?;
        let raw = captures.get(1)?.as_str();
        Some(Version::parse(raw).map_err(|e| {
            ReleaseError::tag(format!("Tag '{}' has invalid version '{}': {}", tag, raw, e))
        }))
    }

    pub fn matches(&self, tag: &str) -> bool {
        matches!(self.parse(tag), Some(Ok(_)))
    }
}
