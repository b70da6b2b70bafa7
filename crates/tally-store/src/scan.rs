//! Lazy directory scans over stored records.
//!
//! A scan lists the files directly under one type directory (no recursion)
//! and decodes them one at a time as the iterator advances. Files that fail
//! to read or decode surface as [`ScanEntry::Malformed`]; queries drop them,
//! so malformed files are invisible to predicate lookups.
//!
//! Enumeration order is whatever the directory listing returns and must be
//! treated as unspecified.

use std::fs::{self, ReadDir};
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tally_codec::Codec;
use tracing::{debug, warn};

/// One file seen by a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEntry<T> {
    /// The file decoded cleanly.
    Record(T),
    /// The file could not be read or decoded.
    Malformed { path: PathBuf, error: String },
}

impl<T> ScanEntry<T> {
    /// The decoded record, dropping malformed entries.
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Record(record) => Some(record),
            Self::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Iterator decoding every file directly under a directory.
pub struct ScanIter<'s, T, C> {
    entries: Option<ReadDir>,
    codec: &'s C,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T, C> ScanIter<'s, T, C> {
    /// Start a scan of `dir`. A missing directory yields nothing.
    pub(crate) fn new(dir: &Path, codec: &'s C) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => Some(entries),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot list directory; scan is empty");
                None
            }
        };
        Self {
            entries,
            codec,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned, C: Codec> Iterator for ScanIter<'_, T, C> {
    type Item = ScanEntry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "failed to read directory entry");
                    continue;
                }
            };

            match entry.file_type() {
                Ok(kind) if kind.is_file() => {}
                _ => continue,
            }

            let path = entry.path();
            let decoded = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| self.codec.decode(&text).map_err(|e| e.to_string()));

            return Some(match decoded {
                Ok(record) => ScanEntry::Record(record),
                Err(error) => ScanEntry::Malformed { path, error },
            });
        }
    }
}

/// A restartable, predicate-filtered scan.
///
/// Every call to [`RecordQuery::iter`] (or iterating `&query`) lists the
/// directory again, so records written in between are seen.
pub struct RecordQuery<'s, T, F, C> {
    dir: PathBuf,
    codec: &'s C,
    predicate: F,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T, F, C> RecordQuery<'s, T, F, C>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
    C: Codec,
{
    pub(crate) fn new(dir: PathBuf, codec: &'s C, predicate: F) -> Self {
        Self {
            dir,
            codec,
            predicate,
            _marker: PhantomData,
        }
    }

    /// Start a fresh scan.
    pub fn iter(&self) -> QueryIter<'_, T, F, C> {
        QueryIter {
            scan: ScanIter::new(&self.dir, self.codec),
            predicate: &self.predicate,
        }
    }

    /// The directory this query scans.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<'q, 's, T, F, C> IntoIterator for &'q RecordQuery<'s, T, F, C>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
    C: Codec,
{
    type Item = T;
    type IntoIter = QueryIter<'q, T, F, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of one [`RecordQuery`] pass.
pub struct QueryIter<'q, T, F, C> {
    scan: ScanIter<'q, T, C>,
    predicate: &'q F,
}

impl<T, F, C> Iterator for QueryIter<'_, T, F, C>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
    C: Codec,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            match self.scan.next()? {
                ScanEntry::Record(record) if (self.predicate)(&record) => return Some(record),
                ScanEntry::Record(_) => continue,
                ScanEntry::Malformed { path, error } => {
                    debug!(path = %path.display(), error = %error, "skipping malformed record");
                }
            }
        }
    }
}
