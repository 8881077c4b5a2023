//! The encryption engine: typed authenticated encryption over one key.
//!
//! A [`CryptoManager`] holds a single validated master key's cipher context
//! for its lifetime and nothing else. Every operation is a synchronous,
//! CPU-bound transform with no per-call mutable state, so one instance can
//! be shared across any number of concurrent callers without locking.

use crate::error::Error;
use crate::master_key::MasterKey;
use crate::token::{Token, NONCE_SIZE, TOKEN_VERSION};
use crate::value::{tag, FieldValue};
use chacha20poly1305::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    ChaCha20Poly1305, Key, Nonce,
};

/// Typed authenticated encryption/decryption over a single validated key.
///
/// The engine is stateless across calls: `encrypt` is a pure function of
/// (key, input, internally generated randomness), `decrypt` of (key, token).
/// No ordering guarantees exist or are needed between independent calls.
///
/// # Example
///
/// ```
/// use fieldseal::manager::CryptoManager;
/// use fieldseal::master_key::MasterKey;
/// use fieldseal::value::FieldValue;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = MasterKey::from_bytes(vec![7u8; 32])?;
/// let engine = CryptoManager::new(key);
///
/// let token = engine.encrypt(&FieldValue::from("hello"))?;
/// assert_eq!(engine.decrypt(&token)?, FieldValue::from("hello"));
/// # Ok(())
/// # }
/// ```
pub struct CryptoManager {
    cipher: ChaCha20Poly1305,
}

impl CryptoManager {
    /// Creates an engine bound to the given master key.
    ///
    /// The key has already passed the cipher self-test at construction, so
    /// this cannot fail. The key is held for the engine's lifetime and
    /// never mutated.
    #[must_use]
    pub fn new(master_key: MasterKey) -> Self {
        let key = Key::from(*master_key.expose());
        Self { cipher: ChaCha20Poly1305::new(&key) }
    }

    /// Encrypts a typed value into a self-contained binary token.
    ///
    /// The value's wire tag travels inside the encrypted payload, so the
    /// stored type is authenticated along with the data and reconstructed
    /// exactly on decrypt — no content-based inference.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` for a top-level JSON null.
    /// - `Error::UnsupportedType` for a non-finite float.
    /// - `Error::Cryptography` if the primitive fails unexpectedly.
    pub fn encrypt(&self, value: &FieldValue) -> Result<Vec<u8>, Error> {
        let wire = value.to_wire()?;
        self.seal(&wire)
    }

    /// Decrypts a token back into its typed value.
    ///
    /// Accepts a token in its native binary form or its URL-safe base64
    /// transport form. Decryption is non-destructive and repeatable.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` for empty input.
    /// - `Error::Cryptography` for an invalid transport encoding or a
    ///   malformed token.
    /// - `Error::SecurityValidation` if authentication fails — tampered
    ///   bytes and a wrong key are indistinguishable here.
    pub fn decrypt(&self, token: &[u8]) -> Result<FieldValue, Error> {
        let wire = self.open(token)?;
        FieldValue::from_wire(&wire)
    }

    /// Encrypts raw binary, bypassing all value normalization.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cryptography` if the primitive fails unexpectedly.
    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut wire = Vec::with_capacity(1 + data.len());
        wire.push(tag::BYTES);
        wire.extend_from_slice(data);
        self.seal(&wire)
    }

    /// Decrypts a token that must hold raw binary.
    ///
    /// # Errors
    ///
    /// In addition to the [`CryptoManager::decrypt`] errors, returns
    /// `Error::TypeMismatch` if the authenticated tag names any other
    /// value type — the strict API never reinterprets.
    pub fn decrypt_bytes(&self, token: &[u8]) -> Result<Vec<u8>, Error> {
        let wire = self.open(token)?;
        match FieldValue::from_wire(&wire)? {
            FieldValue::Bytes(data) => Ok(data),
            other => Err(Error::TypeMismatch { expected: "bytes", found: other.type_name() }),
        }
    }

    /// AEAD-encrypts a tagged wire payload under a fresh random nonce.
    fn seal(&self, wire: &[u8]) -> Result<Vec<u8>, Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        // The format version is associated data: flipping it in a stored
        // token fails authentication instead of changing interpretation.
        let ciphertext = self
            .cipher
            .encrypt(&nonce, Payload { msg: wire, aad: &[TOKEN_VERSION] })
            .map_err(|e| Error::Cryptography(format!("encryption failed: {e}")))?;

        Ok(Token::new(nonce_bytes, ciphertext).to_bytes())
    }

    /// Parses and AEAD-decrypts a token, returning the tagged wire payload.
    fn open(&self, token: &[u8]) -> Result<Vec<u8>, Error> {
        let token = Token::decode(token)?;
        let nonce = Nonce::from(*token.nonce());

        self.cipher
            .decrypt(&nonce, Payload { msg: token.ciphertext(), aad: &[token.version()] })
            .map_err(|_| Error::SecurityValidation)
    }
}
