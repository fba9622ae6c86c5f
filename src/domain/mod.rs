//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod release;
pub mod rule;
pub mod tag;
pub mod version;

pub use branch::{BranchRule, BranchSet};
pub use commit::{CommitParser, ParsedCommit};
pub use prerelease::{PreRelease, PreReleaseType};
pub use release::{LastRelease, NextRelease};
pub use rule::ReleaseRule;
pub use tag::TagFormat;
pub use version::{bump_version, next_version, parse_version, ReleaseLevel};
