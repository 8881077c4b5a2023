//! Master key material and its validation.
//!
//! A master key is 32 bytes of symmetric key material, transported as
//! URL-safe base64. Validation happens at construction: a key that cannot
//! build a cipher context is rejected at load time, never at first use.

use crate::error::KeyStoreError;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use secrecy::{ExposeSecret, Secret};

/// Master key size in bytes (256 bits).
pub const MASTER_KEY_SIZE: usize = 32;

/// A validated master key, held in memory for the process lifetime.
///
/// The raw bytes live in a [`Secret`] fixed-size array, zeroized on drop.
/// The length invariant is carried in the type, so building a cipher
/// context from a `MasterKey` cannot fail. The key is immutable after
/// construction; it is the only state the engine shares across calls,
/// which is what makes a single engine instance safe to use from any
/// number of concurrent callers.
pub struct MasterKey {
    material: Secret<[u8; MASTER_KEY_SIZE]>,
}

impl MasterKey {
    /// Creates a master key from raw bytes, running the engine self-test.
    ///
    /// The cipher accepts every 32-byte key, so the fixed-length
    /// conversion IS the self-test: once it succeeds, cipher construction
    /// is infallible by type.
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::KeyInvalid` if the material is not exactly
    /// 32 bytes.
    pub fn from_bytes(material: Vec<u8>) -> Result<Self, KeyStoreError> {
        let material: [u8; MASTER_KEY_SIZE] = material.try_into().map_err(|m: Vec<u8>| {
            KeyStoreError::KeyInvalid(format!(
                "expected {MASTER_KEY_SIZE} bytes, got {}",
                m.len()
            ))
        })?;

        Ok(Self { material: Secret::new(material) })
    }

    /// Creates a master key from its URL-safe base64 transport encoding.
    ///
    /// Missing `=` padding is repaired before decoding — a deliberate
    /// leniency for keys transcribed without padding, not a correctness
    /// requirement of the cipher.
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::KeyInvalid` if the text does not decode or
    /// the decoded material fails [`MasterKey::from_bytes`] validation.
    pub fn from_encoded(encoded: &str) -> Result<Self, KeyStoreError> {
        let padded = repair_padding(encoded.trim());
        let material = URL_SAFE
            .decode(padded.as_bytes())
            .map_err(|e| KeyStoreError::KeyInvalid(format!("invalid base64: {e}")))?;
        Self::from_bytes(material)
    }

    /// Returns the padded URL-safe base64 encoding of the key material.
    #[must_use]
    pub fn encoded(&self) -> String {
        URL_SAFE.encode(self.material.expose_secret())
    }

    /// Exposes the raw key bytes for cipher construction.
    #[must_use]
    pub(crate) fn expose(&self) -> &[u8; MASTER_KEY_SIZE] {
        self.material.expose_secret()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("MasterKey").finish_non_exhaustive()
    }
}

/// Pads a base64 string with `=` to the nearest multiple of 4.
fn repair_padding(encoded: &str) -> String {
    let remainder = encoded.len() % 4;
    if remainder == 0 {
        encoded.to_string()
    } else {
        let mut padded = String::with_capacity(encoded.len() + 4 - remainder);
        padded.push_str(encoded);
        for _ in 0..(4 - remainder) {
            padded.push('=');
        }
        padded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyStoreError;

    #[test]
    fn test_from_bytes_accepts_32_bytes() {
        let key = MasterKey::from_bytes(vec![7u8; 32]).expect("valid key rejected");
        assert_eq!(key.expose().len(), MASTER_KEY_SIZE);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        for len in [0, 16, 31, 33, 64] {
            let result = MasterKey::from_bytes(vec![0u8; len]);
            assert!(matches!(result, Err(KeyStoreError::KeyInvalid(_))), "len {len} accepted");
        }
    }

    #[test]
    fn test_encoded_round_trip() {
        let key = MasterKey::from_bytes(vec![42u8; 32]).unwrap();
        let restored = MasterKey::from_encoded(&key.encoded()).unwrap();
        assert_eq!(key.expose(), restored.expose());
    }

    #[test]
    fn test_padding_repair() {
        let key = MasterKey::from_bytes(vec![42u8; 32]).unwrap();
        let stripped: String = key.encoded().trim_end_matches('=').to_string();

        let restored = MasterKey::from_encoded(&stripped).unwrap();
        assert_eq!(key.expose(), restored.expose());
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        let result = MasterKey::from_encoded("not!valid!base64!");
        assert!(matches!(result, Err(KeyStoreError::KeyInvalid(_))));
    }

    #[test]
    fn test_from_encoded_rejects_short_material() {
        let short = URL_SAFE.encode([1u8; 16]);
        let result = MasterKey::from_encoded(&short);
        assert!(matches!(result, Err(KeyStoreError::KeyInvalid(_))));
    }

    #[test]
    fn test_debug_does_not_leak_material() {
        let key = MasterKey::from_bytes(vec![0xAB; 32]).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("171"));
        assert!(!debug.contains("ab"));
    }

    #[test]
    fn test_repair_padding_lengths() {
        assert_eq!(repair_padding("abcd"), "abcd");
        assert_eq!(repair_padding("abc"), "abc=");
        assert_eq!(repair_padding("ab"), "ab==");
    }
}
