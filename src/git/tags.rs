//! Locate the previous release of a branch from its tags

use crate::boundary::BoundaryWarning;
use crate::domain::{LastRelease, PreRelease, PreReleaseType, TagFormat};
use crate::error::Result;
use crate::git::Repository;
use git2::Oid;
use tracing::debug;

/// Release tags reachable from a branch head
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseTags {
    /// Highest stable release
    pub last_release: Option<LastRelease>,
    /// Highest prerelease of the branch's own channel
    pub last_prerelease: Option<LastRelease>,
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseTags {
    /// The release the new commit range starts after
    pub fn range_start(&self) -> Option<&LastRelease> {
        match (&self.last_release, &self.last_prerelease) {
            (Some(stable), Some(pre)) => Some(if pre.version > stable.version {
                pre
            } else {
                stable
            }),
            (stable, pre) => stable.as_ref().or(pre.as_ref()),
        }
    }
}

/// Scan the tags reachable from `head` that follow `format`.
///
/// Tags not produced by the format are ignored; tags that look like releases
/// but carry an invalid version are reported as warnings. Prereleases only
/// count when `prerelease` names their label.
pub fn find_release_tags<R: Repository>(
    repo: &R,
    head: Oid,
    format: &TagFormat,
    prerelease: Option<&PreReleaseType>,
) -> Result<ReleaseTags> {
    let mut found = ReleaseTags::default();

    for tag in repo.list_tags()? {
        let version = match format.parse(&tag) {
            None => continue,
            Some(Err(e)) => {
                found.warnings.push(BoundaryWarning::UnparsableTag {
                    tag: tag.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            Some(Ok(version)) => version,
        };

        let Some(oid) = repo.find_tag_oid(&tag)? else {
            continue;
        };
        if !repo.is_ancestor(oid, head)? {
            debug!(tag = %tag, "tag not reachable from branch head");
            continue;
        }

        let candidate = LastRelease {
            version,
            git_tag: tag,
            oid,
        };

        let slot = if candidate.version.pre.is_empty() {
            &mut found.last_release
        } else {
            let same_channel = PreRelease::of_version(&candidate.version)
                .zip(prerelease)
                .is_some_and(|(pre, label)| pre.identifier == *label);
            if !same_channel {
                continue;
            }
            &mut found.last_prerelease
        };

        if slot
            .as_ref()
            .map_or(true, |current| candidate.version > current.version)
        {
            *slot = Some(candidate);
        }
    }

    Ok(found)
}
