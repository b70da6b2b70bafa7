use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypeError;

/// A typed value persisted as one encoded file, keyed by its identity.
///
/// Implementors name the directory their records live in through
/// [`Record::TYPE_NAME`] and expose the key through
/// [`Record::identity_key`]. The key must be stable for the lifetime of the
/// record: re-saving a record with the same key overwrites its file.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tally_types::Record;
///
/// #[derive(Serialize, Deserialize)]
/// struct Widget {
///     #[serde(rename = "Id")]
///     id: String,
/// }
///
/// impl Record for Widget {
///     const TYPE_NAME: &'static str = "Widget";
///
///     fn identity_key(&self) -> Option<String> {
///         Some(self.id.clone())
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// Directory name under the repository root.
    const TYPE_NAME: &'static str;

    /// The record's key, or `None` when it has no usable identity.
    ///
    /// A record without identity is skipped on save; other records in the
    /// same batch are still written.
    fn identity_key(&self) -> Option<String>;
}

/// Resolve a record's identity, treating `None` and the empty key alike.
pub fn resolve_identity<R: Record>(record: &R) -> Result<String, TypeError> {
    match record.identity_key() {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(TypeError::MissingIdentity {
            type_name: R::TYPE_NAME.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Note {
        id: Option<String>,
    }

    impl Record for Note {
        const TYPE_NAME: &'static str = "Note";

        fn identity_key(&self) -> Option<String> {
            self.id.clone()
        }
    }

    #[test]
    fn resolves_present_key() {
        let note = Note { id: Some("n-1".into()) };
        assert_eq!(resolve_identity(&note).unwrap(), "n-1");
    }

    #[test]
    fn missing_key_is_an_error() {
        let note = Note { id: None };
        assert_eq!(
            resolve_identity(&note).unwrap_err(),
            TypeError::MissingIdentity { type_name: "Note".into() }
        );
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let note = Note { id: Some(String::new()) };
        assert!(resolve_identity(&note).is_err());
    }
}
