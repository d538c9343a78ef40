//! Codec Module
//!
//! Converts typed values to and from the text blobs kept in the store.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

// == Decoded ==
/// Outcome of decoding a stored blob.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// A usable value
    Value(T),
    /// The blob encodes an explicit null
    Null,
    /// The blob is not a valid encoding of `T`
    Malformed(String),
}

impl<T> Decoded<T> {
    /// Collapses to the usable value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Decoded::Value(value) => Some(value),
            Decoded::Null | Decoded::Malformed(_) => None,
        }
    }
}

// == Codec Trait ==
/// Text encoding used between the coordinator and the store.
///
/// `decode` must never fault: every failure is reported as `Malformed`.
pub trait Codec: Send + Sync {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String>;

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Decoded<T>;
}

// == JSON Codec ==
/// serde_json based codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Decoded<T> {
        match serde_json::from_str::<Option<T>>(text) {
            Ok(Some(value)) => Decoded::Value(value),
            Ok(None) => Decoded::Null,
            Err(e) => Decoded::Malformed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_roundtrip() {
        let codec = JsonCodec;
        let value = vec!["a".to_string(), "b".to_string()];

        let text = codec.encode(&value).unwrap();
        assert_eq!(codec.decode::<Vec<String>>(&text), Decoded::Value(value));
    }

    #[test]
    fn test_json_null_is_not_a_value() {
        let decoded = JsonCodec.decode::<i32>("null");
        assert_eq!(decoded, Decoded::Null);
        assert!(decoded.into_value().is_none());
    }

    #[test]
    fn test_json_malformed_does_not_panic() {
        assert!(matches!(
            JsonCodec.decode::<i32>("{not json"),
            Decoded::Malformed(_)
        ));
        assert!(matches!(
            JsonCodec.decode::<i32>("\"forty-two\""),
            Decoded::Malformed(_)
        ));
    }

    #[test]
    fn test_json_encode_failure_is_reported() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not valid JSON object keys");

        let result = JsonCodec.encode(&map);
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
