//! In-memory history backend for tests and git-less embedding.
//!
//! [`InMemoryBackend`] keeps the staged and committed snapshots as maps of
//! path to BLAKE3 content hash behind a `RwLock`. The files themselves stay
//! on disk under the root; only the history is lost when the backend is
//! dropped.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;
use walkdir::WalkDir;

use crate::entry::{CommitRequest, HistoryEntry};
use crate::error::{HistoryError, HistoryResult};
use crate::traits::VersionControl;

type Snapshot = BTreeMap<PathBuf, blake3::Hash>;

#[derive(Debug, Default)]
struct MemoryState {
    staged: Snapshot,
    committed: Snapshot,
    /// Oldest first.
    entries: Vec<HistoryEntry>,
}

/// An in-memory implementation of [`VersionControl`].
#[derive(Debug)]
pub struct InMemoryBackend {
    root: PathBuf,
    state: RwLock<MemoryState>,
}

impl InMemoryBackend {
    /// Track the working tree at `root`, starting with an empty history.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    fn relative(&self, path: &Path) -> HistoryResult<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .map_err(|_| HistoryError::OutsideRepository(path.to_path_buf()))
    }

    /// Hash every file currently in the working tree.
    fn scan_worktree(&self) -> HistoryResult<Snapshot> {
        let mut snapshot = Snapshot::new();
        if !self.root.exists() {
            return Ok(snapshot);
        }
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| HistoryError::Backend(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = self.relative(entry.path())?;
            snapshot.insert(rel, blake3::hash(&fs::read(entry.path())?));
        }
        Ok(snapshot)
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> HistoryError {
    HistoryError::Backend(format!("lock poisoned: {e}"))
}

impl VersionControl for InMemoryBackend {
    fn stage(&self, paths: &[PathBuf]) -> HistoryResult<()> {
        let mut state = self.state.write().map_err(lock_err)?;
        for path in paths {
            let rel = self.relative(path)?;
            match fs::read(self.root.join(&rel)) {
                Ok(bytes) => {
                    state.staged.insert(rel, blake3::hash(&bytes));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    state.staged.remove(&rel);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> HistoryResult<bool> {
        let state = self.state.read().map_err(lock_err)?;
        Ok(state.staged != state.committed)
    }

    fn is_dirty(&self) -> HistoryResult<bool> {
        let worktree = self.scan_worktree()?;
        let state = self.state.read().map_err(lock_err)?;
        Ok(state.staged != state.committed || worktree != state.committed)
    }

    fn commit(&self, request: &CommitRequest) -> HistoryResult<HistoryEntry> {
        let message = request.effective_message()?;
        let mut state = self.state.write().map_err(lock_err)?;

        let mut paths: Vec<PathBuf> = state
            .staged
            .iter()
            .filter(|(path, hash)| state.committed.get(*path) != Some(*hash))
            .map(|(path, _)| path.clone())
            .collect();
        paths.extend(
            state
                .committed
                .keys()
                .filter(|path| !state.staged.contains_key(*path))
                .cloned(),
        );
        paths.sort();

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tally-memory-rev-v1:");
        if let Some(parent) = state.entries.last() {
            hasher.update(parent.revision.as_bytes());
        }
        hasher.update(message.as_bytes());
        hasher.update(&request.timestamp.timestamp().to_le_bytes());
        for (path, hash) in &state.staged {
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update(hash.as_bytes());
        }

        let entry = HistoryEntry {
            revision: hasher.finalize().to_hex().to_string(),
            author: request.author.clone(),
            timestamp: request.timestamp,
            message,
            paths,
        };

        state.committed = state.staged.clone();
        state.entries.push(entry.clone());
        debug!(revision = %entry.short_revision(), "recorded in-memory entry");
        Ok(entry)
    }

    fn log(&self, limit: usize) -> HistoryResult<Vec<HistoryEntry>> {
        let state = self.state.read().map_err(lock_err)?;
        Ok(state.entries.iter().rev().take(limit).cloned().collect())
    }
}
