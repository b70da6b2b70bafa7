//! The identity convention for untyped JSON documents.
//!
//! A document's key comes from its single top-level field named `Id`.
//! Field names are compared ASCII-case-insensitively, so `Id`, `id` and `ID`
//! all qualify; a document carrying more than one of them is ambiguous.

use serde_json::Value;

use crate::error::TypeError;

/// Name of the identity field in stored documents.
pub const IDENTITY_FIELD: &str = "Id";

/// Extract the identity of a JSON document saved under `type_name`.
///
/// String ids are used verbatim; numeric ids use their JSON rendering.
pub fn document_identity(type_name: &str, document: &Value) -> Result<String, TypeError> {
    let object = document.as_object().ok_or_else(|| TypeError::NotAnObject {
        type_name: type_name.to_string(),
    })?;

    let matches: Vec<&Value> = object
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(IDENTITY_FIELD))
        .map(|(_, value)| value)
        .collect();

    match matches.as_slice() {
        [] => Err(TypeError::MissingIdentity {
            type_name: type_name.to_string(),
        }),
        [value] => match value {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            Value::String(_) => Err(TypeError::MissingIdentity {
                type_name: type_name.to_string(),
            }),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(TypeError::UnsupportedIdentity {
                type_name: type_name.to_string(),
            }),
        },
        many => Err(TypeError::AmbiguousIdentity {
            type_name: type_name.to_string(),
            count: many.len(),
        }),
    }
}
