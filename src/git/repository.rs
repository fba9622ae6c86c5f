use crate::error::{ReleaseError, Result};
use crate::git::CommitInfo;
use git2::{Oid, Repository as Git2Repo};
use std::path::Path;
use std::sync::Mutex;

/// Wrapper around git2::Repository with our trait interface
///
/// `git2::Repository` is `Send` but not `Sync`, so access goes through a mutex.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
        }
    }

    fn with_repo<T>(&self, f: impl FnOnce(&Git2Repo) -> Result<T>) -> Result<T> {
        let repo = self
            .repo
            .lock()
            .map_err(|_| ReleaseError::branch("repository lock poisoned"))?;
        f(&repo)
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        self.with_repo(|repo| {
            let head = repo
                .head()
                .map_err(|e| ReleaseError::branch(format!("Cannot read HEAD: {}", e)))?;
            if !head.is_branch() {
                return Err(ReleaseError::branch("HEAD is detached, pass --branch"));
            }
            head.shorthand()
                .map(str::to_string)
                .ok_or_else(|| ReleaseError::branch("HEAD branch name is not valid UTF-8"))
        })
    }

    fn branch_head_oid(&self, branch_name: &str) -> Result<Oid> {
        self.with_repo(|repo| {
            let branch = repo
                .find_branch(branch_name, git2::BranchType::Local)
                .map_err(|e| {
                    ReleaseError::branch(format!("Cannot find branch '{}': {}", branch_name, e))
                })?;

            branch.get().target().ok_or_else(|| {
                ReleaseError::branch(format!("Branch '{}' has no target", branch_name))
            })
        })
    }

    fn commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>> {
        self.with_repo(|repo| {
            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;
            revwalk.push(to_oid)?;
            if let Some(from) = from_oid {
                revwalk.hide(from)?;
            }

            let mut commits = Vec::new();
            for oid_result in revwalk {
                let oid = oid_result?;
                let commit = repo.find_commit(oid)?;

                commits.push(CommitInfo {
                    hash: oid.to_string(),
                    message: commit.message().unwrap_or("(empty message)").to_string(),
                    author: commit.author().name().unwrap_or("unknown").to_string(),
                });
            }

            Ok(commits)
        })
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        self.with_repo(|repo| {
            let reference_name = format!("refs/tags/{}", tag_name);

            match repo.find_reference(&reference_name) {
                Ok(reference) => {
                    let commit = reference.peel_to_commit().map_err(|e| {
                        ReleaseError::tag(format!("Cannot peel tag '{}': {}", tag_name, e))
                    })?;
                    Ok(Some(commit.id()))
                }
                Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
                Err(e) => Err(ReleaseError::tag(format!(
                    "Cannot find tag '{}': {}",
                    tag_name, e
                ))),
            }
        })
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.with_repo(|repo| {
            let tags = repo.tag_names(None)?;
            Ok(tags.iter().flatten().map(str::to_string).collect())
        })
    }

    fn is_ancestor(&self, ancestor: Oid, descendant: Oid) -> Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        self.with_repo(|repo| Ok(repo.graph_descendant_of(descendant, ancestor)?))
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        self.with_repo(|repo| {
            let object = repo
                .find_object(oid, None)
                .map_err(|e| ReleaseError::tag(format!("Cannot find object: {}", e)))?;

            repo.tag_lightweight(name, &object, false)
                .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) -> Oid {
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_commits_between_and_tags() {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();
        let first = commit(&raw, "feat: first");
        let second = commit(&raw, "fix: second");
        let third = commit(&raw, "chore: third");

        let repo = Git2Repository::from_git2(raw);
        repo.create_tag("v1.0.0", first).unwrap();

        assert_eq!(repo.find_tag_oid("v1.0.0").unwrap(), Some(first));
        assert_eq!(repo.find_tag_oid("v9.9.9").unwrap(), None);
        assert_eq!(repo.list_tags().unwrap(), vec!["v1.0.0".to_string()]);

        let commits = repo.commits_between(Some(first), third).unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["fix: second", "chore: third"]);
        assert_eq!(commits[0].hash, second.to_string());

        assert_eq!(repo.commits_between(None, third).unwrap().len(), 3);
        assert!(repo.is_ancestor(first, third).unwrap());
        assert!(!repo.is_ancestor(third, first).unwrap());
        assert!(repo.create_tag("v1.0.0", third).is_err());
    }
}
