use crate::domain::prerelease::{PreRelease, PreReleaseType};
use crate::error::{ReleaseError, Result};
use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Release level decided for a commit or a batch of commits.
///
/// Variants are declared in ascending severity so `Ord` gives
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReleaseLevel {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl ReleaseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseLevel::None => "none",
            ReleaseLevel::Patch => "patch",
            ReleaseLevel::Minor => "minor",
            ReleaseLevel::Major => "major",
        }
    }

    /// Whether this level produces a release at all
    pub fn is_release(&self) -> bool {
        *self != ReleaseLevel::None
    }
}

impl fmt::Display for ReleaseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseLevel {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ReleaseLevel::Major),
            "minor" => Ok(ReleaseLevel::Minor),
            "patch" => Ok(ReleaseLevel::Patch),
            "none" | "false" => Ok(ReleaseLevel::None),
            other => Err(ReleaseError::config(format!(
                "Unknown release level '{}' (expected major, minor, patch or false)",
                other
            ))),
        }
    }
}

/// Release levels are written either as a level name or as `false`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawReleaseLevel {
    Flag(bool),
    Name(String),
}

impl<'de> Deserialize<'de> for ReleaseLevel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawReleaseLevel::deserialize(deserializer)? {
            RawReleaseLevel::Flag(false) => Ok(ReleaseLevel::None),
            RawReleaseLevel::Flag(true) => Err(serde::de::Error::custom(
                "release = true is ambiguous, name a level (major, minor, patch)",
            )),
            RawReleaseLevel::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl Serialize for ReleaseLevel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ReleaseLevel::None => serializer.serialize_bool(false),
            level => serializer.serialize_str(level.as_str()),
        }
    }
}

/// Parse a version from a tag-like string, tolerating a leading `v` or `V`
pub fn parse_version(text: &str) -> Result<Version> {
    let clean = text.trim().trim_start_matches('v').trim_start_matches('V');
    Version::parse(clean)
        .map_err(|e| ReleaseError::version(format!("Invalid version '{}': {}", text, e)))
}

/// Bump the release core of `version`. Prerelease and build metadata are dropped.
pub fn bump_version(version: &Version, level: ReleaseLevel) -> Version {
    match level {
        ReleaseLevel::Major => Version::new(version.major + 1, 0, 0),
        ReleaseLevel::Minor => Version::new(version.major, version.minor + 1, 0),
        ReleaseLevel::Patch => Version::new(version.major, version.minor, version.patch + 1),
        ReleaseLevel::None => Version::new(version.major, version.minor, version.patch),
    }
}

/// Compute the next version for a batch classified at `level`.
///
/// * `last_release` - latest stable release reachable from the branch
/// * `last_prerelease` - latest prerelease of the branch's own channel
/// * `prerelease` - the branch's prerelease label, if it is a prerelease branch
/// * `initial` - version used when the branch has never been released
///
/// Returns `None` when `level` produces no release.
pub fn next_version(
    last_release: Option<&Version>,
    last_prerelease: Option<&Version>,
    level: ReleaseLevel,
    prerelease: Option<&PreReleaseType>,
    initial: &Version,
) -> Result<Option<Version>> {
    if !level.is_release() {
        return Ok(None);
    }

    let base = match last_release {
        Some(last) => bump_version(last, level),
        None => Version::new(initial.major, initial.minor, initial.patch),
    };

    let Some(label) = prerelease else {
        return Ok(Some(base));
    };

    // Continue the running prerelease series when it already covers this bump
    if let Some((previous, previous_pre)) =
        last_prerelease.and_then(|p| PreRelease::of_version(p).map(|pre| (p, pre)))
    {
        let previous_core = Version::new(previous.major, previous.minor, previous.patch);
        if previous_pre.identifier == *label && previous_core >= base {
            let next = previous_pre.increment_iteration();
            return Ok(Some(with_prerelease(&previous_core, &next)?));
        }
    }

    let first = PreRelease::new(label.clone(), Some(1));
    Ok(Some(with_prerelease(&base, &first)?))
}

fn with_prerelease(core: &Version, pre: &PreRelease) -> Result<Version> {
    let mut version = core.clone();
    version.pre = semver::Prerelease::new(&pre.to_string())
        .map_err(|e| ReleaseError::version(format!("Invalid prerelease '{}': {}", pre, e)))?;
    Ok(version)
}
