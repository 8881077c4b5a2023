//! Token framing for authenticated ciphertext.
//!
//! A token is self-contained: it embeds everything needed to decrypt given
//! the correct key, and nothing else. Binary layout:
//!
//! ```text
//! [version:1][nonce:12][aead_ciphertext (payload + 16-byte tag)]
//! ```
//!
//! The version byte is fed to the AEAD as associated data, so a flipped
//! version is caught by authentication rather than silently reinterpreted.
//!
//! Tokens may also travel as URL-safe base64 text — the form a persistence
//! layer stores in text columns. [`Token::decode`] accepts either form.

use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

/// Current token format version.
pub const TOKEN_VERSION: u8 = 1;

/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;

/// AEAD authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Minimum length of a well-formed binary token: version + nonce + tag.
const MIN_TOKEN_LEN: usize = 1 + NONCE_SIZE + TAG_SIZE;

/// A parsed token: format version, nonce, and the AEAD ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    version: u8,
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl Token {
    /// Creates a token in the current format version.
    #[must_use]
    pub fn new(nonce: [u8; NONCE_SIZE], ciphertext: Vec<u8>) -> Self {
        Self { version: TOKEN_VERSION, nonce, ciphertext }
    }

    /// Returns the format version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Returns the nonce.
    #[must_use]
    pub const fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Returns the AEAD ciphertext (payload + authentication tag).
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serializes the token to its binary form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + NONCE_SIZE + self.ciphertext.len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Serializes the token to its textual transport form.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE.encode(self.to_bytes())
    }

    /// Parses a token from its binary form.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` for empty input.
    /// - `Error::UnsupportedVersion` for a version this build cannot read.
    /// - `Error::Cryptography` for truncated input.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::EmptyData);
        }

        let version = data[0];
        if version != TOKEN_VERSION {
            return Err(Error::UnsupportedVersion {
                version,
                supported: TOKEN_VERSION.to_string(),
            });
        }

        if data.len() < MIN_TOKEN_LEN {
            return Err(Error::Cryptography(format!(
                "token truncated: {} bytes (minimum: {MIN_TOKEN_LEN})",
                data.len()
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[1..=NONCE_SIZE]);
        let ciphertext = data[1 + NONCE_SIZE..].to_vec();

        Ok(Self { version, nonce, ciphertext })
    }

    /// Parses a token from either its binary or textual transport form.
    ///
    /// Bytes beginning with a known binary version byte are used directly;
    /// anything else is treated as URL-safe base64 text. The two are never
    /// ambiguous — no base64 alphabet character has the value of a
    /// supported version byte.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyData` for empty input.
    /// - `Error::SecurityValidation` for damaged binary input.
    /// - `Error::Cryptography` for text that is not valid base64.
    /// - `Error::UnsupportedVersion` for an unreadable format version.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::EmptyData);
        }

        if data[0] == TOKEN_VERSION {
            return Self::from_bytes(data);
        }

        // Anything else must be the textual transport form. A binary token
        // with a damaged leading byte is not valid UTF-8 text, so it lands
        // here and reports as what the damage is: failed validation.
        let Ok(text) = std::str::from_utf8(data) else {
            return Err(Error::SecurityValidation);
        };
        let decoded = URL_SAFE
            .decode(text.trim().as_bytes())
            .map_err(|e| Error::Cryptography(format!("invalid token base64: {e}")))?;
        Self::from_bytes(&decoded)
    }
}
