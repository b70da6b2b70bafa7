//! Git-backed history via libgit2.
//!
//! Each history entry is a commit on the repository's current branch. The
//! working tree is the store root itself, so stored files are ordinary
//! tracked files that any git client can inspect.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use git2::{Commit, ErrorCode, Repository, Signature, Sort, StatusOptions, Time, Tree};
use tally_types::Author;
use tracing::{debug, info};

use crate::entry::{CommitRequest, HistoryEntry};
use crate::error::{HistoryError, HistoryResult};
use crate::traits::VersionControl;

/// A [`VersionControl`] backend over a git working tree.
///
/// `git2::Repository` is `Send` but not `Sync`; the mutex exists only to
/// make the backend shareable. It does not span a stage-then-commit
/// sequence.
pub struct GitBackend {
    root: PathBuf,
    repo: Mutex<Repository>,
}

impl std::fmt::Debug for GitBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitBackend").field("root", &self.root).finish()
    }
}

impl GitBackend {
    /// Open the repository whose working tree is exactly `root`, initializing
    /// one if none exists yet. Calling this on an initialized root is a
    /// plain open.
    pub fn init_or_open(root: impl AsRef<Path>) -> HistoryResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let repo = match Repository::open(root) {
            Ok(repo) => {
                debug!(root = %root.display(), "opened existing repository");
                repo
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                let repo = Repository::init(root)?;
                info!(root = %root.display(), "initialized repository");
                repo
            }
            Err(e) => return Err(e.into()),
        };

        if repo.workdir().is_none() {
            return Err(HistoryError::BareRepository(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
            repo: Mutex::new(repo),
        })
    }

    /// The working tree root this backend was opened at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> HistoryResult<MutexGuard<'_, Repository>> {
        self.repo
            .lock()
            .map_err(|e| HistoryError::Backend(format!("lock poisoned: {e}")))
    }

    /// Express `path` relative to the working tree.
    fn relative(&self, repo: &Repository, path: &Path) -> HistoryResult<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Ok(rel.to_path_buf());
        }
        repo.workdir()
            .and_then(|workdir| path.strip_prefix(workdir).ok())
            .map(Path::to_path_buf)
            .ok_or_else(|| HistoryError::OutsideRepository(path.to_path_buf()))
    }
}

impl VersionControl for GitBackend {
    fn stage(&self, paths: &[PathBuf]) -> HistoryResult<()> {
        let repo = self.lock()?;
        let mut index = repo.index()?;
        for path in paths {
            let rel = self.relative(&repo, path)?;
            if self.root.join(&rel).exists() {
                index.add_path(&rel)?;
            } else {
                index.remove_path(&rel)?;
            }
        }
        index.write()?;
        debug!(count = paths.len(), "staged paths");
        Ok(())
    }

    fn has_staged_changes(&self) -> HistoryResult<bool> {
        let repo = self.lock()?;
        let index = repo.index()?;
        let head_tree = head_commit(&repo)?.map(|c| c.tree()).transpose()?;
        let diff = repo.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        Ok(diff.deltas().len() > 0)
    }

    fn is_dirty(&self) -> HistoryResult<bool> {
        let repo = self.lock()?;
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn commit(&self, request: &CommitRequest) -> HistoryResult<HistoryEntry> {
        let repo = self.lock()?;
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent = head_commit(&repo)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let signature = signature(&request.author, &request.timestamp)?;
        let message = request.effective_message()?;
        let oid = repo.commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)?;

        let commit = repo.find_commit(oid)?;
        entry_from_commit(&repo, &commit)
    }

    fn log(&self, limit: usize) -> HistoryResult<Vec<HistoryEntry>> {
        let repo = self.lock()?;
        if head_commit(&repo)?.is_none() {
            return Ok(Vec::new());
        }

        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL)?;
        walk.push_head()?;

        walk.take(limit)
            .map(|oid| -> HistoryResult<HistoryEntry> {
                let commit = repo.find_commit(oid?)?;
                entry_from_commit(&repo, &commit)
            })
            .collect()
    }
}

/// The commit HEAD points to, or `None` on a fresh repository.
fn head_commit(repo: &Repository) -> HistoryResult<Option<Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn signature(author: &Author, timestamp: &DateTime<Utc>) -> HistoryResult<Signature<'static>> {
    let time = Time::new(timestamp.timestamp(), 0);
    Ok(Signature::new(&author.name, &author.email, &time)?)
}

fn entry_from_commit(repo: &Repository, commit: &Commit<'_>) -> HistoryResult<HistoryEntry> {
    let signature = commit.author();
    let tree = commit.tree()?;
    let parent_tree: Option<Tree<'_>> = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    let paths = diff
        .deltas()
        .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
        .map(Path::to_path_buf)
        .collect();

    Ok(HistoryEntry {
        revision: commit.id().to_string(),
        author: Author {
            name: signature.name().unwrap_or_default().to_string(),
            email: signature.email().unwrap_or_default().to_string(),
        },
        timestamp: DateTime::from_timestamp(signature.when().seconds(), 0).unwrap_or_default(),
        message: commit.message().unwrap_or_default().to_string(),
        paths,
    })
}
