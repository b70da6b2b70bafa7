//! Small filesystem helpers shared by both stores.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Write `bytes` to `root/rel`, creating parent directories on demand.
pub(crate) fn write_file(root: &Path, rel: &Path, bytes: &[u8]) -> io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

/// Rewind `stream` and copy it to `root/rel`. The destination handle is
/// closed before returning; the stream is left open.
pub(crate) fn copy_stream<S>(root: &Path, rel: &Path, stream: &mut S) -> io::Result<u64>
where
    S: Read + Seek + ?Sized,
{
    stream.seek(SeekFrom::Start(0))?;
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(&path)?;
    let copied = io::copy(stream, &mut file)?;
    file.flush()?;
    Ok(copied)
}

/// Read `path` as text, mapping "not found" to `None`.
pub(crate) fn read_text(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
