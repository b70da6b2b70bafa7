//! Text codec for Tally records.
//!
//! Records are stored as indented JSON so that every history entry produces a
//! readable line diff. The [`Codec`] trait is the seam the stores encode
//! through; [`JsonCodec`] is the only implementation.

pub mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes values to text and back.
///
/// `decode` must accept everything `encode` produces. Malformed input is
/// reported as [`CodecError::Decode`], never as a panic.
pub trait Codec: Send + Sync {
    /// Encode a value to its textual form.
    fn encode<T: Serialize>(&self, value: &T) -> CodecResult<String>;

    /// Decode a value from text.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> CodecResult<T>;
}

/// Indented JSON codec (two-space indentation).
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> CodecResult<String> {
        serde_json::to_string_pretty(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> CodecResult<T> {
        serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        #[serde(rename = "Id")]
        id: String,
        #[serde(rename = "Name")]
        name: String,
    }

    fn widget() -> Widget {
        Widget { id: "42".into(), name: "x".into() }
    }

    #[test]
    fn encode_is_indented() {
        let text = JsonCodec.encode(&widget()).unwrap();
        assert_eq!(text, "{\n  \"Id\": \"42\",\n  \"Name\": \"x\"\n}");
    }

    #[test]
    fn decode_reads_encoded_output() {
        let text = JsonCodec.encode(&widget()).unwrap();
        let back: Widget = JsonCodec.decode(&text).unwrap();
        assert_eq!(back, widget());
    }

    #[test]
    fn decode_accepts_compact_input() {
        let back: Widget = JsonCodec.decode(r#"{"Id":"42","Name":"x"}"#).unwrap();
        assert_eq!(back, widget());
    }

    #[test]
    fn malformed_input_is_a_decode_failure() {
        let err = JsonCodec.decode::<Widget>("{not json").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn shape_mismatch_is_a_decode_failure() {
        let err = JsonCodec.decode::<Widget>(r#"{"Id": 5}"#).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn non_string_map_keys_fail_to_encode() {
        let mut map = BTreeMap::new();
        map.insert((1, 2), "pair");
        let err = JsonCodec.encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Encode(_)));
    }
}
