//! Git operations abstraction layer
//!
//! The [Repository] trait covers what git-release needs from version
//! control: branch heads, commit ranges, tags and ancestry. Implementations:
//!
//! - [repository::Git2Repository]: a real repository through the `git2` crate
//! - [mock::MockRepository]: an in-memory history for tests
//!
//! ```rust
//! # use git_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_release::Result<()> {
//! let head = repo.branch_head_oid("main")?;
//! let commits = repo.commits_between(None, head)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod tags;

pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use tags::{find_release_tags, ReleaseTags};

use crate::error::Result;
use git2::Oid;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,
    pub message: String,
    pub author: String,
}

/// Common git operation trait
///
/// All implementors must be `Send + Sync`. Implementations map underlying
/// errors (like `git2::Error`) to [crate::error::ReleaseError] variants.
pub trait Repository: Send + Sync {
    /// Name of the currently checked out branch
    fn current_branch(&self) -> Result<String>;

    /// OID of the commit at the tip of a local branch
    fn branch_head_oid(&self, branch_name: &str) -> Result<Oid>;

    /// Commits reachable from `to_oid` but not from `from_oid`, oldest first.
    /// With `from_oid = None` the whole history up to `to_oid` is returned.
    fn commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>>;

    /// Commit a tag points to, `None` if the tag does not exist.
    /// Annotated tags are peeled to their commit.
    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Whether `ancestor` is `descendant` or one of its ancestors
    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool>;

    /// Create a lightweight tag at the given commit; fails if the tag exists
    fn create_tag(&self, name: &str, oid: Oid) -> Result<()>;
}
