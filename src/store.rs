// src/store.rs

use crate::error::{Result, StatsError};
use git2::{Delta, DiffOptions, ErrorCode, FileMode, Oid, Repository, Sort};
use std::path::Path;
use tracing::debug;

/// What happened to a path between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Insert,
    Delete,
    Modify,
}

/// One path touched by a tree diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub action: ChangeAction,
    /// Blob before the change; `None` for inserts
    pub old: Option<Oid>,
    /// Blob after the change; `None` for deletes
    pub new: Option<Oid>,
}

impl ChangeRecord {
    pub fn insert(path: impl Into<String>, new: Oid) -> Self {
        Self { path: path.into(), action: ChangeAction::Insert, old: None, new: Some(new) }
    }

    pub fn delete(path: impl Into<String>, old: Oid) -> Self {
        Self { path: path.into(), action: ChangeAction::Delete, old: Some(old), new: None }
    }

    pub fn modify(path: impl Into<String>, old: Oid, new: Oid) -> Self {
        Self { path: path.into(), action: ChangeAction::Modify, old: Some(old), new: Some(new) }
    }
}

/// Read access to commits, trees and blobs.
pub trait ObjectStore {
    /// First parent of `commit`, `None` for a root commit.
    fn parent_of(&self, commit: Oid) -> Result<Option<Oid>>;

    /// Paths that differ between the trees of commits `old` and `new`. With
    /// no `old` commit, `new` is compared against the empty tree.
    fn diff_trees(&self, old: Option<Oid>, new: Oid) -> Result<Vec<ChangeRecord>>;

    fn read_blob(&self, id: Oid) -> Result<Vec<u8>>;
}

fn not_found_as(id: Oid) -> impl FnOnce(git2::Error) -> StatsError {
    move |e| {
        if e.code() == ErrorCode::NotFound {
            StatsError::NotFound(id)
        } else {
            StatsError::Git(e)
        }
    }
}

impl ObjectStore for Repository {
    fn parent_of(&self, commit: Oid) -> Result<Option<Oid>> {
        let commit = self.find_commit(commit).map_err(not_found_as(commit))?;
        if commit.parent_count() == 0 {
            return Ok(None);
        }
        Ok(Some(commit.parent_id(0)?))
    }

    fn diff_trees(&self, old: Option<Oid>, new: Oid) -> Result<Vec<ChangeRecord>> {
        let old_tree = match old {
            Some(old) => Some(self.find_commit(old).map_err(not_found_as(old))?.tree()?),
            None => None,
        };
        let new_tree = self.find_commit(new).map_err(not_found_as(new))?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_submodules(true);

        let diff = self.diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut diff_opts))?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for delta in diff.deltas() {
            let (old_file, new_file) = (delta.old_file(), delta.new_file());
            let path = new_file
                .path()
                .or_else(|| old_file.path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            // Submodule entries point at commits in another repository
            if old_file.mode() == FileMode::Commit || new_file.mode() == FileMode::Commit {
                debug!("{}: skipping submodule entry", path);
                continue;
            }

            let change = match delta.status() {
                Delta::Added => ChangeRecord::insert(path, new_file.id()),
                Delta::Deleted => ChangeRecord::delete(path, old_file.id()),
                Delta::Modified | Delta::Typechange => {
                    ChangeRecord::modify(path, old_file.id(), new_file.id())
                }
                status => {
                    debug!("{}: ignoring {:?} delta", path, status);
                    continue;
                }
            };
            changes.push(change);
        }

        Ok(changes)
    }

    fn read_blob(&self, id: Oid) -> Result<Vec<u8>> {
        let blob = self.find_blob(id).map_err(not_found_as(id))?;
        Ok(blob.content().to_vec())
    }
}

/// Opens the repository containing `path`.
pub fn open(path: &Path) -> Result<Repository> {
    let repo = Repository::discover(path)?;
    debug!("Opened git repository at {:?}", repo.path());
    Ok(repo)
}

/// Resolves a revision (`HEAD`, a branch, a short hash...) to a commit id.
pub fn resolve_commit(repo: &Repository, rev: &str) -> Result<Oid> {
    let object = repo.revparse_single(rev)?;
    Ok(object.peel_to_commit()?.id())
}

/// Commits reachable from `to` but not from `from`, oldest first.
pub fn commits_in_range(repo: &Repository, from: &str, to: &str) -> Result<Vec<Oid>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
    revwalk.push(resolve_commit(repo, to)?)?;
    revwalk.hide(resolve_commit(repo, from)?)?;

    let mut commits = Vec::new();
    for oid in revwalk {
        commits.push(oid?);
    }
    Ok(commits)
}
