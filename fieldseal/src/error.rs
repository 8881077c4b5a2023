//! Error types for `fieldseal` operations.

use std::fmt;
use std::path::PathBuf;

/// Main error type for `fieldseal` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller passed an absent or empty value where one is required
    #[error("empty data: nothing to encrypt or decrypt")]
    EmptyData,

    /// The engine cannot serialize this value
    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    /// The binary-strict API was given a token of a different value type
    #[error("type mismatch: expected {expected}, token holds {found}")]
    TypeMismatch {
        /// The value type the caller asked for
        expected: &'static str,
        /// The value type actually stored in the token
        found: &'static str,
    },

    /// Authentication check failed during decryption.
    ///
    /// Tampered bytes and a wrong key are indistinguishable here; the
    /// underlying AEAD primitive cannot tell them apart either. Callers
    /// that need to distinguish must track key identity out of band.
    #[error("security validation failed: data tampered or wrong key")]
    SecurityValidation,

    /// Unexpected failure from the underlying primitive or transport encoding
    #[error("cryptography error: {0}")]
    Cryptography(String),

    /// Unsupported token format version
    #[error("unsupported token version: {version} (supported: {supported})")]
    UnsupportedVersion {
        /// The version found in the token
        version: u8,
        /// Supported versions
        supported: String,
    },

    /// Operation attempted on an adapter that has not been bound to an engine
    #[error("crypto engine not initialized: bind an engine before use")]
    NotInitialized,

    /// Second bind attempted on an already-bound adapter
    #[error("crypto engine already bound: binding happens exactly once per process")]
    AlreadyBound,

    /// Key store operation failed
    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),
}

/// Errors specific to master-key provisioning and storage.
///
/// These are fatal at startup: a process that cannot load or generate a
/// usable master key must not begin serving encrypt/decrypt calls.
#[derive(Debug)]
pub enum KeyStoreError {
    /// Key file does not exist at the expected path
    NotFound(PathBuf),

    /// Key file exists but is not in the expected format
    FormatInvalid(String),

    /// Key material fails the engine's self-test
    KeyInvalid(String),

    /// Key generation failed
    GenerationFailed(String),

    /// I/O operation failed
    Io(std::io::Error),
}

impl fmt::Display for KeyStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "master key not found: {}", path.display()),
            Self::FormatInvalid(msg) => write!(f, "key file format invalid: {msg}"),
            Self::KeyInvalid(msg) => write!(f, "master key invalid: {msg}"),
            Self::GenerationFailed(msg) => write!(f, "key generation failed: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for KeyStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
