use crate::domain::version::ReleaseLevel;
use git2::Oid;
use semver::Version;

/// A release tag found in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelease {
    pub version: Version,
    pub git_tag: String,
    pub oid: Oid,
}

/// The release about to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRelease {
    pub version: Version,
    pub git_tag: String,
    pub level: ReleaseLevel,
    pub channel: Option<String>,
}

impl NextRelease {
    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }
}
