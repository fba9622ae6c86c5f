//! Prerelease labels for prerelease branches
//!
//! A branch such as `develop` configured with `prerelease = "beta"` publishes
//! versions like `1.3.0-beta.1`, `1.3.0-beta.2`. The label is the identifier,
//! the trailing number is the iteration within the series.
//! See https://semver.org/#spec-item-9

use crate::error::{ReleaseError, Result};
use semver::Version;
use std::fmt;
use std::str::FromStr;

/// Prerelease identifier (alpha, beta, rc, or a custom label)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseType {
    Alpha,
    Beta,
    ReleaseCandidate,
    Custom(String),
}

impl PreReleaseType {
    /// Parse a label; "alpha", "beta" and "rc" are matched case-insensitively,
    /// any other alphanumeric-hyphen string is kept verbatim
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for PreReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alpha" => Ok(PreReleaseType::Alpha),
            "beta" => Ok(PreReleaseType::Beta),
            "rc" => Ok(PreReleaseType::ReleaseCandidate),
            "" => Err(ReleaseError::version("Empty prerelease label")),
            _ => {
                if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                    Ok(PreReleaseType::Custom(s.to_string()))
                } else {
                    Err(ReleaseError::version(format!(
                        "Invalid prerelease label: '{}'",
                        s
                    )))
                }
            }
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
            PreReleaseType::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Prerelease component of a version, e.g. "beta.2"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub identifier: PreReleaseType,
    pub iteration: Option<u32>,
}

impl PreRelease {
    pub fn new(identifier: PreReleaseType, iteration: Option<u32>) -> Self {
        PreRelease {
            identifier,
            iteration,
        }
    }

    /// Parse "beta", "beta.1" or "custom-id.5"
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let identifier = PreReleaseType::parse(parts.next().unwrap_or_default())?;

        let iteration = match parts.next() {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                ReleaseError::version(format!("Invalid prerelease iteration: '{}'", raw))
            })?),
            None => None,
        };

        if parts.next().is_some() {
            return Err(ReleaseError::version(format!(
                "Unsupported prerelease format: '{}'",
                s
            )));
        }

        Ok(PreRelease {
            identifier,
            iteration,
        })
    }

    /// Extract the prerelease of a version, `None` for stable versions or
    /// prerelease strings this crate did not produce
    pub fn of_version(version: &Version) -> Option<Self> {
        if version.pre.is_empty() {
            return None;
        }
        PreRelease::parse(version.pre.as_str()).ok()
    }

    /// Next iteration of the series; a bare label starts at 1
    pub fn increment_iteration(&self) -> Self {
        PreRelease {
            identifier: self.identifier.clone(),
            iteration: Some(self.iteration.map_or(1, |n| n + 1)),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        if let Some(iter) = self.iteration {
            write!(f, ".{}", iter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_type_parse_known() {
        assert_eq!(
            PreReleaseType::parse("alpha").unwrap(),
            PreReleaseType::Alpha
        );
        assert_eq!(PreReleaseType::parse("Beta").unwrap(), PreReleaseType::Beta);
        assert_eq!(
            PreReleaseType::parse("rc").unwrap(),
            PreReleaseType::ReleaseCandidate
        );
    }

    #[test]
    fn test_prerelease_type_parse_custom() {
        assert_eq!(
            PreReleaseType::parse("next-major").unwrap(),
            PreReleaseType::Custom("next-major".to_string())
        );
    }

    #[test]
    fn test_custom_label_keeps_case() {
        let label = PreReleaseType::parse("RC-Internal").unwrap();
        assert_eq!(label, PreReleaseType::Custom("RC-Internal".to_string()));
        assert_eq!(label.to_string(), "RC-Internal");

        let pr = PreRelease::parse("RC-Internal.2").unwrap();
        assert_eq!(pr.increment_iteration().to_string(), "RC-Internal.3");
    }

    #[test]
    fn test_prerelease_type_parse_invalid() {
        assert!(PreReleaseType::parse("invalid!name").is_err());
        assert!(PreReleaseType::parse("invalid.name").is_err());
        assert!(PreReleaseType::parse("").is_err());
    }

    #[test]
    fn test_prerelease_type_display_roundtrips_label() {
        assert_eq!(PreReleaseType::ReleaseCandidate.to_string(), "rc");
        assert_eq!(PreReleaseType::Custom("dev".to_string()).to_string(), "dev");
    }

    #[test]
    fn test_prerelease_parse_with_iteration() {
        let pr = PreRelease::parse("beta.1").unwrap();
        assert_eq!(pr.identifier, PreReleaseType::Beta);
        assert_eq!(pr.iteration, Some(1));
    }

    #[test]
    fn test_prerelease_parse_rejects_bad_iteration() {
        assert!(PreRelease::parse("beta.abc").is_err());
        assert!(PreRelease::parse("beta.1.2").is_err());
        assert!(PreRelease::parse("").is_err());
    }

    #[test]
    fn test_prerelease_of_version() {
        let version = Version::parse("1.3.0-rc.3").unwrap();
        let pr = PreRelease::of_version(&version).unwrap();
        assert_eq!(pr.identifier, PreReleaseType::ReleaseCandidate);
        assert_eq!(pr.iteration, Some(3));

        let stable = Version::parse("1.3.0").unwrap();
        assert!(PreRelease::of_version(&stable).is_none());
    }

    #[test]
    fn test_prerelease_increment() {
        let pr = PreRelease::parse("beta.9").unwrap();
        assert_eq!(pr.increment_iteration().to_string(), "beta.10");

        let bare = PreRelease::new(PreReleaseType::Alpha, None);
        assert_eq!(bare.increment_iteration().to_string(), "alpha.1");
    }
}
