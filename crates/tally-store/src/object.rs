//! Typed record storage: one encoded file per record, one history entry per
//! save call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tally_codec::{Codec, JsonCodec};
use tally_history::HistoryRecorder;
use tally_paths::{record_dir, record_path};
use tally_types::{document_identity, resolve_identity, Record, TypeError};
use tracing::{debug, warn};

use crate::disk;
use crate::error::{SkipReason, StoreResult};
use crate::report::SaveReport;
use crate::scan::{RecordQuery, ScanIter};

/// Stores records at `{root}/{TypeName}/{id}.json`.
///
/// Saves write first and commit second: a write failure skips only that
/// item, and a history failure leaves the written files on disk
/// uncommitted. Reads never consult history.
pub struct ObjectStore<C = JsonCodec> {
    root: PathBuf,
    codec: C,
    recorder: Arc<HistoryRecorder>,
}

impl ObjectStore<JsonCodec> {
    /// A JSON record store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, recorder: Arc<HistoryRecorder>) -> Self {
        Self::with_codec(root, JsonCodec, recorder)
    }
}

impl<C: Codec> ObjectStore<C> {
    pub fn with_codec(root: impl Into<PathBuf>, codec: C, recorder: Arc<HistoryRecorder>) -> Self {
        Self {
            root: root.into(),
            codec,
            recorder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ---- Typed records ----

    /// Save one record and commit it as `Save {Type} {id}`.
    pub fn save_one<R: Record>(&self, record: &R) -> SaveReport {
        self.save_single(R::TYPE_NAME, resolve_identity(record), record)
    }

    /// Save every record in order, then commit all written paths as one
    /// entry, `Save {count} {Type} records`.
    pub fn save_many<'r, R, I>(&self, records: I) -> SaveReport
    where
        R: Record + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        self.save_batch(
            R::TYPE_NAME,
            records.into_iter().map(|r| (resolve_identity(r), r)),
        )
    }

    /// Load the record `id`. Missing or undecodable files are `None`.
    pub fn get_one<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        self.read(&record_path(R::TYPE_NAME, id))
    }

    /// Lazily scan all records of `R` matching `predicate`.
    pub fn get_many<R, F>(&self, predicate: F) -> RecordQuery<'_, R, F, C>
    where
        R: Record,
        F: Fn(&R) -> bool,
    {
        RecordQuery::new(self.root.join(record_dir(R::TYPE_NAME)), &self.codec, predicate)
    }

    /// Scan all files of `R`, reporting malformed ones instead of dropping
    /// them.
    pub fn scan<R: Record>(&self) -> ScanIter<'_, R, C> {
        ScanIter::new(&self.root.join(record_dir(R::TYPE_NAME)), &self.codec)
    }

    // ---- Untyped documents ----

    /// Save a JSON object under `type_name`, keyed by its single `Id` field.
    pub fn save_document(&self, type_name: &str, document: &Value) -> SaveReport {
        self.save_single(type_name, document_identity(type_name, document), document)
    }

    /// Batch counterpart of [`ObjectStore::save_document`].
    pub fn save_documents<'d, I>(&self, type_name: &str, documents: I) -> SaveReport
    where
        I: IntoIterator<Item = &'d Value>,
    {
        self.save_batch(
            type_name,
            documents
                .into_iter()
                .map(|d| (document_identity(type_name, d), d)),
        )
    }

    pub fn get_document(&self, type_name: &str, id: &str) -> StoreResult<Option<Value>> {
        self.read(&record_path(type_name, id))
    }

    pub fn documents<F>(&self, type_name: &str, predicate: F) -> RecordQuery<'_, Value, F, C>
    where
        F: Fn(&Value) -> bool,
    {
        RecordQuery::new(self.root.join(record_dir(type_name)), &self.codec, predicate)
    }

    // ---- Internals ----

    fn save_single<T: Serialize>(
        &self,
        type_name: &str,
        key: Result<String, TypeError>,
        value: &T,
    ) -> SaveReport {
        let mut report = SaveReport::default();
        match self.write_item(type_name, key, value) {
            Ok((key, path)) => {
                report.add_written(path);
                let message = format!("Save {type_name} {key}");
                report.commit = self.recorder.record(&report.written, &message);
            }
            Err(reason) => {
                warn!(type_name, error = %reason, "record not saved");
                report.add_skipped(0, reason);
            }
        }
        report
    }

    fn save_batch<'v, T, I>(&self, type_name: &str, items: I) -> SaveReport
    where
        T: Serialize + 'v,
        I: Iterator<Item = (Result<String, TypeError>, &'v T)>,
    {
        let mut report = SaveReport::default();
        for (index, (key, value)) in items.enumerate() {
            match self.write_item(type_name, key, value) {
                Ok((_, path)) => report.add_written(path),
                Err(reason) => {
                    warn!(type_name, index, error = %reason, "record skipped in batch");
                    report.add_skipped(index, reason);
                }
            }
        }

        let message = format!("Save {} {type_name} records", report.written.len());
        report.commit = self.recorder.record(&report.written, &message);
        report
    }

    fn write_item<T: Serialize>(
        &self,
        type_name: &str,
        key: Result<String, TypeError>,
        value: &T,
    ) -> Result<(String, PathBuf), SkipReason> {
        let key = key?;
        let text = self.codec.encode(value)?;
        let rel = record_path(type_name, &key);
        disk::write_file(&self.root, &rel, text.as_bytes())?;
        debug!(path = %rel.display(), bytes = text.len(), "wrote record");
        Ok((key, rel))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, rel: &Path) -> StoreResult<Option<T>> {
        let path = self.root.join(rel);
        let text = match disk::read_text(&path) {
            Ok(Some(text)) => text,
            Ok(None) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), error = %e, "record is not valid text; treating as missing");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match self.codec.decode(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "record failed to decode; treating as missing");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::fs;
    use tally_history::{CommitOutcome, InMemoryBackend};
    use tally_types::Author;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        #[serde(rename = "Id")]
        id: String,
        #[serde(rename = "Name")]
        name: String,
    }

    impl Record for Widget {
        const TYPE_NAME: &'static str = "Widget";

        fn identity_key(&self) -> Option<String> {
            Some(self.id.clone())
        }
    }

    fn widget(id: &str, name: &str) -> Widget {
        Widget { id: id.into(), name: name.into() }
    }

    fn author() -> Author {
        Author::new("bot", "bot@example.com").unwrap()
    }

    fn memory_store(root: &Path) -> (ObjectStore, Arc<HistoryRecorder>) {
        let recorder = Arc::new(HistoryRecorder::new(InMemoryBackend::new(root), author()));
        (ObjectStore::new(root, recorder.clone()), recorder)
    }

    #[test]
    fn save_one_writes_and_commits() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());

        let report = store.save_one(&widget("42", "x"));
        assert_eq!(report.written, vec![PathBuf::from("Widget/42.json")]);
        assert!(report.is_complete());

        let text = fs::read_to_string(dir.path().join("Widget/42.json")).unwrap();
        assert_eq!(text, "{\n  \"Id\": \"42\",\n  \"Name\": \"x\"\n}");

        let history = recorder.history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].summary(), "Save Widget 42");
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        store.save_one(&widget("7", "seven"));
        assert_eq!(store.get_one::<Widget>("7").unwrap(), Some(widget("7", "seven")));
    }

    #[test]
    fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        assert_eq!(store.get_one::<Widget>("nonexistent").unwrap(), None);
    }

    #[test]
    fn malformed_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        fs::create_dir_all(dir.path().join("Widget")).unwrap();
        fs::write(dir.path().join("Widget/bad.json"), "{ not json").unwrap();
        assert_eq!(store.get_one::<Widget>("bad").unwrap(), None);
    }

    #[test]
    fn resaving_unchanged_record_adds_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());
        store.save_one(&widget("1", "a"));
        let second = store.save_one(&widget("1", "a"));
        assert_eq!(second.commit, CommitOutcome::Unchanged);
        assert_eq!(recorder.history(10).unwrap().len(), 1);

        store.save_one(&widget("1", "b"));
        assert_eq!(recorder.history(10).unwrap().len(), 2);
    }

    #[test]
    fn save_many_is_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());
        let widgets = vec![widget("a", "1"), widget("b", "2"), widget("c", "3")];

        let report = store.save_many(&widgets);
        assert_eq!(report.written.len(), 3);

        let history = recorder.history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].summary(), "Save 3 Widget records");
        assert_eq!(history[0].paths.len(), 3);
    }

    #[test]
    fn batch_survives_missing_identity() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());
        let widgets = vec![widget("a", "1"), widget("", "nameless"), widget("c", "3")];

        let report = store.save_many(&widgets);
        assert_eq!(
            report.written,
            vec![PathBuf::from("Widget/a.json"), PathBuf::from("Widget/c.json")]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::Identity(_)));

        let entry = report.commit.entry().expect("committed");
        assert_eq!(entry.paths.len(), 2);
        assert_eq!(recorder.history(10).unwrap().len(), 1);
    }

    #[test]
    fn single_save_without_identity_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());
        let report = store.save_one(&widget("", "x"));
        assert!(report.written.is_empty());
        assert_eq!(report.commit, CommitOutcome::Empty);
        assert!(recorder.history(10).unwrap().is_empty());
    }

    #[test]
    fn write_failure_is_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        // A directory where the record file should go makes that write fail.
        fs::create_dir_all(dir.path().join("Widget/blocked.json")).unwrap();

        let widgets = vec![widget("ok", "1"), widget("blocked", "2")];
        let report = store.save_many(&widgets);
        assert_eq!(report.written, vec![PathBuf::from("Widget/ok.json")]);
        assert!(matches!(report.skipped[0].reason, SkipReason::Io(_)));
        assert!(report.commit.is_committed());
    }

    #[test]
    fn sanitized_ids_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        let id = "a/b:c?<d>";
        store.save_one(&widget(id, "odd"));
        assert!(dir.path().join("Widget/a_b_c__d_.json").exists());
        assert_eq!(store.get_one::<Widget>(id).unwrap(), Some(widget(id, "odd")));
    }

    #[test]
    fn get_many_filters() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        store.save_many(&[widget("1", "keep"), widget("2", "drop"), widget("3", "keep")]);
        fs::write(dir.path().join("Widget/junk.json"), "garbage").unwrap();

        let mut kept: Vec<String> = store
            .get_many(|w: &Widget| w.name == "keep")
            .iter()
            .map(|w| w.id)
            .collect();
        kept.sort();
        assert_eq!(kept, vec!["1", "3"]);
    }

    #[test]
    fn get_many_on_unsaved_type_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        assert_eq!(store.get_many(|_: &Widget| true).iter().count(), 0);
    }

    #[test]
    fn scan_exposes_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = memory_store(dir.path());
        store.save_one(&widget("1", "a"));
        fs::write(dir.path().join("Widget/junk.json"), "garbage").unwrap();

        let malformed = store.scan::<Widget>().filter(|e| e.is_malformed()).count();
        assert_eq!(malformed, 1);
        assert_eq!(store.get_many(|_: &Widget| true).iter().count(), 1);
    }

    #[test]
    fn documents_follow_identity_convention() {
        let dir = tempfile::tempdir().unwrap();
        let (store, recorder) = memory_store(dir.path());

        let report = store.save_document("Gadget", &json!({"Id": "g1", "size": 3}));
        assert_eq!(report.written, vec![PathBuf::from("Gadget/g1.json")]);

        let batch = [json!({"Id": "g2"}), json!({"Id": "x", "ID": "y"}), json!({"size": 1})];
        let report = store.save_documents("Gadget", &batch);
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(recorder.history(10).unwrap()[0].summary(), "Save 1 Gadget records");

        let loaded = store.get_document("Gadget", "g1").unwrap().unwrap();
        assert_eq!(loaded["size"], 3);
        assert_eq!(store.documents("Gadget", |_| true).iter().count(), 2);
    }

    #[test]
    fn history_failure_leaves_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let recorder = Arc::new(HistoryRecorder::open_git(&root, author()).unwrap());
        let store = ObjectStore::new(&root, recorder.clone());
        // Lock the index so staging fails.
        fs::write(root.join(".git/index.lock"), "").unwrap();

        let report = store.save_one(&widget("1", "a"));
        assert!(report.commit.is_failed());
        assert!(root.join("Widget/1.json").exists());
        assert_eq!(store.get_one::<Widget>("1").unwrap(), Some(widget("1", "a")));

        fs::remove_file(root.join(".git/index.lock")).unwrap();
        assert!(recorder.is_dirty().unwrap());
    }
}
