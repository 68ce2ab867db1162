//! Msgpack codec for payload trees.
//!
//! Payloads travel as msgpack maps with string keys. Decoding goes through a
//! generic value first so the caller decides which payload shape to load.

use serde_json::Value;

use crate::error::{CodecError, PayloadError};
use crate::names::FieldNames;
use crate::tree::PayloadTree;

/// Encodes an arbitrary value as msgpack.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when serialisation fails.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, CodecError> {
    Ok(rmp_serde::to_vec(value)?)
}

/// Decodes msgpack bytes into a generic value.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for truncated or malformed input, and for
/// msgpack constructs without a generic equivalent (binary blobs, non-string
/// map keys).
pub fn decode_value(bytes: &[u8]) -> Result<Value, CodecError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Encodes a payload tree.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when serialisation fails.
pub fn encode(tree: &PayloadTree) -> Result<Vec<u8>, CodecError> {
    Ok(rmp_serde::to_vec(tree.as_map())?)
}

/// Decodes bytes into a payload tree read with the given naming mode.
///
/// # Errors
///
/// Returns [`PayloadError::Codec`] when the bytes are not valid msgpack and
/// [`PayloadError::NotAMapping`] when the top-level value is not a map.
pub fn decode(bytes: &[u8], names: FieldNames) -> Result<PayloadTree, PayloadError> {
    let value = decode_value(bytes)?;
    PayloadTree::from_value(value, names)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::kind::ValueKind;

    #[test]
    fn encodes_maps_as_msgpack_maps() {
        let bytes = encode_value(&json!({"a": 1})).expect("encode");
        // fixmap with one entry, fixstr "a", positive fixint 1
        assert_eq!(bytes, vec![0x81, 0xa1, b'a', 0x01]);
    }

    #[test]
    fn preserves_scalar_kinds() {
        let value = json!({"i": -3, "f": 2.5, "s": "x", "b": true, "n": null, "l": [1, "two"]});
        let bytes = encode_value(&value).expect("encode");
        assert_eq!(decode_value(&bytes).expect("decode"), value);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = encode_value(&json!({"key": "value"})).expect("encode");
        let truncated = bytes.get(..bytes.len() - 2).expect("slice");
        assert!(decode_value(truncated).is_err());
    }

    #[test]
    fn rejects_non_mapping_payloads() {
        let bytes = encode_value(&json!("just a string")).expect("encode");
        let error = decode(&bytes, FieldNames::Verbose).expect_err("strings are not payloads");
        assert!(matches!(
            error,
            PayloadError::NotAMapping {
                found: ValueKind::String
            }
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            decode(&[], FieldNames::Compact),
            Err(PayloadError::Codec(CodecError::Decode(_)))
        ));
    }
}
