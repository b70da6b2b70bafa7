use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_history::{HistoryEntry, HistoryRecorder, InMemoryBackend};
use tally_store::{FileStore, ObjectStore};
use tally_types::Author;
use tracing::info;

use crate::config::TallyConfig;
use crate::error::SdkResult;

/// High-level Tally repository API.
///
/// Both stores share one recorder, so a record save and a file save land in
/// the same linear history.
pub struct Tally {
    root: PathBuf,
    recorder: Arc<HistoryRecorder>,
    objects: ObjectStore,
    files: FileStore,
}

impl Tally {
    /// Open the git-backed repository described by `config`.
    pub fn open(config: &TallyConfig) -> SdkResult<Self> {
        Self::open_at(&config.root, config.author()?)
    }

    /// Open (initializing if needed) a git-backed repository at `root`.
    pub fn open_at(root: impl AsRef<Path>, author: Author) -> SdkResult<Self> {
        let root = root.as_ref();
        let recorder = HistoryRecorder::open_git(root, author)?;
        info!(root = %root.display(), author = %recorder.author(), "opened tally repository");
        Ok(Self::with_recorder(root, recorder))
    }

    /// A repository whose history lives only in this process.
    pub fn in_memory(root: impl AsRef<Path>, author: Author) -> Self {
        let root = root.as_ref();
        Self::with_recorder(root, HistoryRecorder::new(InMemoryBackend::new(root), author))
    }

    /// Wire both stores to an existing recorder.
    pub fn with_recorder(root: impl Into<PathBuf>, recorder: HistoryRecorder) -> Self {
        let root = root.into();
        let recorder = Arc::new(recorder);
        Self {
            objects: ObjectStore::new(root.clone(), recorder.clone()),
            files: FileStore::new(root.clone(), recorder.clone()),
            root,
            recorder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn author(&self) -> &Author {
        self.recorder.author()
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Newest-first history, at most `limit` entries.
    pub fn history(&self, limit: usize) -> SdkResult<Vec<HistoryEntry>> {
        Ok(self.recorder.history(limit)?)
    }

    /// Whether the working tree differs from the last entry.
    pub fn is_dirty(&self) -> SdkResult<bool> {
        Ok(self.recorder.is_dirty()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::io::{Cursor, Read};
    use tally_history::CommitOutcome;
    use tally_types::Record;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Widget {
        id: String,
        name: String,
    }

    impl Record for Widget {
        const TYPE_NAME: &'static str = "Widget";
        fn identity_key(&self) -> Option<String> {
            Some(self.id.clone())
        }
    }

    fn bot() -> Author {
        Author::new("bot", "bot@example.com").unwrap()
    }

    #[test]
    fn widget_scenario_on_git() {
        let dir = tempfile::tempdir().unwrap();
        let tally = Tally::open_at(dir.path(), bot()).unwrap();
        let widget = Widget { id: "42".into(), name: "x".into() };

        let report = tally.objects().save_one(&widget);
        assert!(report.is_complete());

        let text = fs::read_to_string(dir.path().join("Widget/42.json")).unwrap();
        assert_eq!(text, "{\n  \"Id\": \"42\",\n  \"Name\": \"x\"\n}");

        let history = tally.history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].message.contains("Widget"));
        assert!(history[0].message.contains("42"));
        assert_eq!(history[0].author, bot());

        assert_eq!(tally.objects().get_one::<Widget>("42").unwrap(), Some(widget));
        assert!(!tally.is_dirty().unwrap());
    }

    #[test]
    fn resaving_unchanged_record_on_git() {
        let dir = tempfile::tempdir().unwrap();
        let tally = Tally::open_at(dir.path(), bot()).unwrap();
        let widget = Widget { id: "7".into(), name: "same".into() };

        tally.objects().save_one(&widget);
        let second = tally.objects().save_one(&widget);
        assert_eq!(second.commit, CommitOutcome::Unchanged);
        assert_eq!(tally.history(10).unwrap().len(), 1);
    }

    #[test]
    fn records_and_files_share_history() {
        let dir = tempfile::tempdir().unwrap();
        let tally = Tally::open_at(dir.path(), bot()).unwrap();

        tally.objects().save_one(&Widget { id: "1".into(), name: "a".into() });
        tally.files().save_one(&mut Cursor::new(b"bytes".to_vec()), "blob.bin");

        let history = tally.history(10).unwrap();
        let summaries: Vec<_> = history.iter().map(|e| e.summary().to_string()).collect();
        assert_eq!(summaries, vec!["Save file blob.bin", "Save Widget 1"]);

        let mut buf = String::new();
        tally.files().get_by_name("blob.bin").unwrap().unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "bytes");
    }

    #[test]
    fn reopen_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        {
            let tally = Tally::open_at(dir.path(), bot()).unwrap();
            tally.objects().save_one(&Widget { id: "1".into(), name: "a".into() });
        }
        let tally = Tally::open_at(dir.path(), bot()).unwrap();
        assert_eq!(tally.history(10).unwrap().len(), 1);
        assert_eq!(tally.objects().get_many(|_: &Widget| true).iter().count(), 1);
    }

    #[test]
    fn open_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = TallyConfig {
            root: dir.path().join("store"),
            ..TallyConfig::default()
        };
        let tally = Tally::open(&config).unwrap();
        assert!(dir.path().join("store/.git").is_dir());
        assert_eq!(tally.author().name, "tally");
    }

    #[test]
    fn in_memory_history() {
        let dir = tempfile::tempdir().unwrap();
        let tally = Tally::in_memory(dir.path(), bot());
        let report = tally.objects().save_many(&[
            Widget { id: "1".into(), name: "a".into() },
            Widget { id: "2".into(), name: "b".into() },
        ]);
        assert_eq!(report.written.len(), 2);
        assert_eq!(tally.history(10).unwrap()[0].summary(), "Save 2 Widget records");
        assert!(!dir.path().join(".git").exists());
    }
}
