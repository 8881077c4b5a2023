//! Typed plaintext values and their wire normalization.
//!
//! Every value the engine accepts is one of a closed set of variants, each
//! with a stable one-byte wire tag. The tag is prepended to the normalized
//! payload before encryption and branched on after decryption, so the stored
//! type is decided at encryption time and authenticated along with the data.
//! There is no content-based type guessing anywhere: an encrypted string
//! `"42"` decrypts back to the string `"42"`, never to a number.

use crate::error::Error;
use serde_json::Value as JsonValue;

/// A plaintext value accepted by the encryption engine.
///
/// Caller-owned; the engine never retains a reference after a call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 text
    Text(String),
    /// Integer, stored as its decimal string representation
    Int(i64),
    /// Finite floating-point number, stored as its decimal representation
    Float(f64),
    /// JSON-compatible tree: maps with string keys, arrays, scalars
    Json(JsonValue),
    /// Raw binary, passes through untouched
    Bytes(Vec<u8>),
}

/// Wire tags for each variant. Stable across format versions; covered by
/// the AEAD authentication because they sit inside the encrypted payload.
pub(crate) mod tag {
    pub const TEXT: u8 = 0x01;
    pub const INT: u8 = 0x02;
    pub const FLOAT: u8 = 0x03;
    pub const JSON: u8 = 0x04;
    pub const BYTES: u8 = 0x05;
}

impl FieldValue {
    /// Returns a human-readable name for the variant, used in errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Json(_) => "json",
            Self::Bytes(_) => "bytes",
        }
    }

    /// Serializes the value to its tagged wire form: `[tag:1][payload]`.
    ///
    /// Numbers become their decimal string representation. JSON trees are
    /// serialized with `serde_json`, which leaves non-ASCII characters
    /// unescaped so stored text stays human-readable UTF-8.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` if the value is a top-level JSON null (the
    ///   "absent value" case — callers must not encrypt nothing).
    /// - `Error::UnsupportedType` for non-finite floats, which have no
    ///   JSON-compatible representation.
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        let (tag, payload): (u8, Vec<u8>) = match self {
            Self::Text(s) => (tag::TEXT, s.as_bytes().to_vec()),
            Self::Int(n) => (tag::INT, n.to_string().into_bytes()),
            Self::Float(x) => {
                if !x.is_finite() {
                    return Err(Error::UnsupportedType(format!("non-finite float: {x}")));
                }
                (tag::FLOAT, x.to_string().into_bytes())
            }
            Self::Json(JsonValue::Null) => return Err(Error::EmptyData),
            Self::Json(v) => {
                let text = serde_json::to_string(v)
                    .map_err(|e| Error::UnsupportedType(format!("unserializable JSON: {e}")))?;
                (tag::JSON, text.into_bytes())
            }
            Self::Bytes(b) => (tag::BYTES, b.clone()),
        };

        let mut wire = Vec::with_capacity(1 + payload.len());
        wire.push(tag);
        wire.extend_from_slice(&payload);
        Ok(wire)
    }

    /// Reconstructs a value from its tagged wire form.
    ///
    /// The wire bytes have already passed AEAD authentication, so a decode
    /// failure here means the token was produced outside this engine's
    /// contract, not that it was tampered with.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` for an empty payload.
    /// - `Error::UnsupportedType` for an unknown tag byte.
    /// - `Error::Cryptography` for a payload that does not parse as the
    ///   type its tag names.
    pub fn from_wire(wire: &[u8]) -> Result<Self, Error> {
        let (&tag, payload) = wire.split_first().ok_or(Error::EmptyData)?;

        match tag {
            tag::TEXT => {
                let s = String::from_utf8(payload.to_vec())
                    .map_err(|e| Error::Cryptography(format!("invalid UTF-8 text: {e}")))?;
                Ok(Self::Text(s))
            }
            tag::INT => {
                let s = std::str::from_utf8(payload)
                    .map_err(|e| Error::Cryptography(format!("invalid UTF-8 integer: {e}")))?;
                let n = s
                    .parse::<i64>()
                    .map_err(|e| Error::Cryptography(format!("invalid integer payload: {e}")))?;
                Ok(Self::Int(n))
            }
            tag::FLOAT => {
                let s = std::str::from_utf8(payload)
                    .map_err(|e| Error::Cryptography(format!("invalid UTF-8 float: {e}")))?;
                let x = s
                    .parse::<f64>()
                    .map_err(|e| Error::Cryptography(format!("invalid float payload: {e}")))?;
                Ok(Self::Float(x))
            }
            tag::JSON => {
                let v = serde_json::from_slice(payload)
                    .map_err(|e| Error::Cryptography(format!("invalid JSON payload: {e}")))?;
                Ok(Self::Json(v))
            }
            tag::BYTES => Ok(Self::Bytes(payload.to_vec())),
            other => Err(Error::UnsupportedType(format!("unknown value tag: {other:#04x}"))),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<JsonValue> for FieldValue {
    fn from(v: JsonValue) -> Self {
        Self::Json(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}
