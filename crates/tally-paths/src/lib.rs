//! Path derivation for the Tally repository layout.
//!
//! Records live at `{TypeName}/{id}.json`; stored files live at
//! `Files/{name}`. Every function here is pure: no I/O, and the same input
//! always yields the same relative path, so saving an id twice overwrites
//! rather than duplicates.
//!
//! Sanitization rules:
//! - Path-invalid characters (`"`, `<`, `>`, `|`, NUL, control characters)
//!   become `_`.
//! - Filename-invalid characters (path-invalid plus `:`, `*`, `?`, `\`, `/`)
//!   become `_`. Record components use this stricter set so an id can never
//!   introduce a subdirectory.
//! - A component made only of dots (`.`, `..`) becomes underscores.
//! - An empty component becomes `_`.
//!
//! The sets are identical on every host so a tree written on one platform
//! reads back on another.

use std::path::PathBuf;

/// Directory holding stored binary files.
pub const FILES_DIR: &str = "Files";

/// Extension of encoded record files.
pub const RECORD_EXTENSION: &str = "json";

/// Characters invalid anywhere in a relative path (besides control characters).
const PATH_INVALID_CHARS: &[char] = &['"', '<', '>', '|'];

/// Additional characters invalid inside a single file name.
const FILENAME_INVALID_CHARS: &[char] = &[':', '*', '?', '\\', '/'];

/// Returns `true` if `ch` may not appear in a relative path.
pub fn is_path_invalid(ch: char) -> bool {
    ch.is_ascii_control() && ch != '\u{7f}' || PATH_INVALID_CHARS.contains(&ch)
}

/// Returns `true` if `ch` may not appear in a single file name.
pub fn is_filename_invalid(ch: char) -> bool {
    is_path_invalid(ch) || FILENAME_INVALID_CHARS.contains(&ch)
}

/// Turn an arbitrary string into a single safe file-name component.
///
/// ```
/// assert_eq!(tally_paths::sanitize_file_name("a/b:c"), "a_b_c");
/// assert_eq!(tally_paths::sanitize_file_name(".."), "__");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    if name.chars().all(|ch| ch == '.') {
        return "_".repeat(name.chars().count());
    }
    name.chars()
        .map(|ch| if is_filename_invalid(ch) { '_' } else { ch })
        .collect()
}

/// Relative path of the record `id` of type `type_name`.
///
/// ```
/// use std::path::PathBuf;
/// assert_eq!(tally_paths::record_path("Widget", "42"), PathBuf::from("Widget/42.json"));
/// ```
pub fn record_path(type_name: &str, id: &str) -> PathBuf {
    PathBuf::from(record_dir(type_name)).join(record_file_name(id))
}

/// Relative directory holding every record of `type_name`.
pub fn record_dir(type_name: &str) -> PathBuf {
    PathBuf::from(sanitize_file_name(type_name))
}

/// File name (without directory) of the record `id`.
pub fn record_file_name(id: &str) -> String {
    format!("{}.{RECORD_EXTENSION}", sanitize_file_name(id))
}

/// Relative path of the stored file `name`.
///
/// ```
/// use std::path::PathBuf;
/// assert_eq!(tally_paths::file_path("a?b.txt"), PathBuf::from("Files/a_b.txt"));
/// ```
pub fn file_path(name: &str) -> PathBuf {
    PathBuf::from(FILES_DIR).join(sanitize_file_name(name))
}
