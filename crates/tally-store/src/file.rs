//! Binary file storage under `{root}/Files`.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_history::HistoryRecorder;
use tally_paths::{file_path, FILES_DIR};
use tracing::{debug, warn};

use crate::disk;
use crate::error::StoreResult;
use crate::report::SaveReport;

/// Stores opaque byte streams by logical name.
///
/// Streams are borrowed: each is rewound to its start, copied to
/// completion, and left open for the caller.
pub struct FileStore {
    root: PathBuf,
    recorder: Arc<HistoryRecorder>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, recorder: Arc<HistoryRecorder>) -> Self {
        Self {
            root: root.into(),
            recorder,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one stream under `name` and commit it as `Save file {name}`.
    pub fn save_one<S>(&self, stream: &mut S, name: &str) -> SaveReport
    where
        S: Read + Seek + ?Sized,
    {
        let mut report = SaveReport::default();
        match self.write_stream(stream, name) {
            Ok(path) => {
                report.add_written(path);
                let message = format!("Save file {name}");
                report.commit = self.recorder.record(&report.written, &message);
            }
            Err(e) => {
                warn!(name, error = %e, "file not saved");
                report.add_skipped(0, e.into());
            }
        }
        report
    }

    /// Store every `(stream, name)` pair, then commit all written files as
    /// one entry, `Save {count} files`.
    pub fn save_many<'s, S, N, I>(&self, items: I) -> SaveReport
    where
        S: Read + Seek + ?Sized + 's,
        N: AsRef<str>,
        I: IntoIterator<Item = (&'s mut S, N)>,
    {
        let mut report = SaveReport::default();
        for (index, (stream, name)) in items.into_iter().enumerate() {
            let name = name.as_ref();
            match self.write_stream(stream, name) {
                Ok(path) => report.add_written(path),
                Err(e) => {
                    warn!(name, index, error = %e, "file skipped in batch");
                    report.add_skipped(index, e.into());
                }
            }
        }

        let message = format!("Save {} files", report.written.len());
        report.commit = self.recorder.record(&report.written, &message);
        report
    }

    /// Open the stored file `name` for reading. The caller owns the handle.
    pub fn get_by_name(&self, name: &str) -> StoreResult<Option<File>> {
        match File::open(self.root.join(file_path(name))) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored files, sorted.
    pub fn list(&self) -> StoreResult<Vec<String>> {
        let dir = self.root.join(FILES_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_stream<S>(&self, stream: &mut S, name: &str) -> io::Result<PathBuf>
    where
        S: Read + Seek + ?Sized,
    {
        let rel = file_path(name);
        let bytes = disk::copy_stream(&self.root, &rel, stream)?;
        debug!(path = %rel.display(), bytes, "wrote file");
        Ok(rel)
    }
}
