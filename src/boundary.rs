use std::fmt;

/// Non-fatal conditions met while computing a release.
/// These are reported to the user and never abort the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No commits since the latest release tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag follows the tag format but its version is not valid semver
    UnparsableTag { tag: String, reason: String },
    /// Commit header is not a conventional commit; it only matches
    /// rules that constrain nothing but the breaking flag
    NonConventionalCommit { hash: String, header: String },
}

fn short(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => write!(
                f,
                "No new commits since tag '{}' (current: {})",
                latest_tag,
                short(current_commit_hash)
            ),
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::NonConventionalCommit { hash, header } => {
                write!(
                    f,
                    "Commit {} is not a conventional commit: '{}'",
                    short(hash),
                    header
                )
            }
        }
    }
}
