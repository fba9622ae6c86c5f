use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory linear history for testing without a git repository
///
/// Commits are kept in the order they were added; the first commit is the
/// root. Every branch head points into that single line of history.
pub struct MockRepository {
    commits: Vec<(Oid, CommitInfo)>,
    tags: Mutex<HashMap<String, Oid>>,
    branch_heads: HashMap<String, Oid>,
    current: Option<String>,
}

impl MockRepository {
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: Mutex::new(HashMap::new()),
            branch_heads: HashMap::new(),
            current: None,
        }
    }

    /// Append a commit with a deterministic OID and return it
    pub fn add_commit(&mut self, message: impl Into<String>) -> Oid {
        let index = self.commits.len() as u32 + 1;
        let mut bytes = [0u8; 20];
        bytes[16..].copy_from_slice(&index.to_be_bytes());
        let oid = Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero());

        self.commits.push((
            oid,
            CommitInfo {
                hash: oid.to_string(),
                message: message.into(),
                author: "Test Author".to_string(),
            },
        ));
        oid
    }

    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        if let Ok(mut tags) = self.tags.lock() {
            tags.insert(name.into(), oid);
        }
    }

    pub fn set_branch_head(&mut self, branch: impl Into<String>, oid: Oid) {
        self.branch_heads.insert(branch.into(), oid);
    }

    pub fn checkout(&mut self, branch: impl Into<String>) {
        self.current = Some(branch.into());
    }

    fn position(&self, oid: Oid) -> Result<usize> {
        self.commits
            .iter()
            .position(|(o, _)| *o == oid)
            .ok_or_else(|| ReleaseError::branch(format!("Unknown commit {}", oid)))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| ReleaseError::branch("No branch checked out"))
    }

    fn branch_head_oid(&self, branch_name: &str) -> Result<Oid> {
        self.branch_heads
            .get(branch_name)
            .copied()
            .ok_or_else(|| ReleaseError::branch(format!("Branch not found: {}", branch_name)))
    }

    fn commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>> {
        let end = self.position(to_oid)?;
        let start = match from_oid {
            Some(from) => self.position(from)? + 1,
            None => 0,
        };
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end]
            .iter()
            .map(|(_, info)| info.clone())
            .collect())
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        let tags = self
            .tags
            .lock()
            .map_err(|_| ReleaseError::tag("tag table poisoned"))?;
        Ok(tags.get(tag_name).copied())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self
            .tags
            .lock()
            .map_err(|_| ReleaseError::tag("tag table poisoned"))?;
        let mut names: Vec<String> = tags.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        Ok(self.position(ancestor)? <= self.position(descendant)?)
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        self.position(oid)?;
        let mut tags = self
            .tags
            .lock()
            .map_err(|_| ReleaseError::tag("tag table poisoned"))?;
        if tags.contains_key(name) {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        tags.insert(name.to_string(), oid);
        Ok(())
    }
}
