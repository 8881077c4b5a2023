//! File-based master-key store for `fieldseal`.
//!
//! Owns the on-disk key artifact: a small JSON file holding the URL-safe
//! base64 key next to its provenance metadata, written with owner-only
//! permissions. One file, one key, loaded once per process.
//!
//! ```text
//! instance/
//! └── .master.key     (JSON, 0600 permissions)
//! ```
//!
//! Key file format:
//!
//! ```json
//! {
//!   "key": "<padded urlsafe base64, 32 bytes decoded>",
//!   "created_at": "2026-08-30T12:00:00Z",
//!   "key_type": "ChaCha20-Poly1305",
//!   "version": "1"
//! }
//! ```
//!
//! Unknown extra fields are ignored; a missing `key` field is fatal.

#![warn(clippy::pedantic, clippy::nursery)]

use chrono::{DateTime, NaiveDateTime, Utc};
use fieldseal::error::KeyStoreError;
use fieldseal::master_key::{MasterKey, MASTER_KEY_SIZE};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroize;

/// PBKDF2-HMAC-SHA256 iteration count for key derivation.
pub const KDF_ITERATIONS: u32 = 480_000;

/// Salt size for key derivation (128 bits).
const SALT_SIZE: usize = 16;

/// Free-text label recorded in the key file.
const KEY_TYPE: &str = "ChaCha20-Poly1305";

/// Key file format version.
const FORMAT_VERSION: &str = "1";

/// On-disk key file contents.
///
/// Only `key` is required on read; the metadata fields are optional so
/// files written by older tooling still load.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFileData {
    key: String,
    #[serde(
        default,
        deserialize_with = "de_created_at",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// Lenient `created_at` parsing.
///
/// Key files written by other tooling carry ISO-8601 timestamps without an
/// offset, which chrono's `DateTime<Utc>` impl rejects. A timestamp that
/// does not parse at all is dropped rather than failing the load — only a
/// missing or unusable `key` is fatal.
fn de_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parses an ISO-8601 timestamp with or without an offset; offset-less
/// timestamps are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|dt| dt.and_utc()))
}

/// Key file metadata, readable without exposing key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileInfo {
    /// When the key was generated, if recorded.
    pub created_at: Option<DateTime<Utc>>,
    /// Free-text key-type label, if recorded.
    pub key_type: Option<String>,
    /// Key file format version, if recorded.
    pub version: Option<String>,
}

/// File-based master-key store.
///
/// Generation and loading never run concurrently against the same path;
/// callers serialize key provisioning externally. The store does not lock
/// the key file.
///
/// # Example
///
/// ```rust,ignore
/// use fieldseal_key_file::FileKeyStore;
///
/// let store = FileKeyStore::new("./instance/.master.key");
/// let key = match store.load() {
///     Err(KeyStoreError::NotFound(_)) => store.generate()?,
///     other => other?,
/// };
/// ```
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    /// Creates a store for the key file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the key file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the master key.
    ///
    /// Base64 padding repair and the cipher self-test happen inside
    /// [`MasterKey::from_encoded`]; an unusable key is rejected here,
    /// never at first use.
    ///
    /// # Errors
    ///
    /// - `KeyStoreError::NotFound` if the file is absent.
    /// - `KeyStoreError::FormatInvalid` if it is not the expected JSON or
    ///   the `key` field is missing.
    /// - `KeyStoreError::KeyInvalid` if the key fails validation.
    pub fn load(&self) -> Result<MasterKey, KeyStoreError> {
        let data = self.read_key_file()?;
        let key = MasterKey::from_encoded(&data.key)?;
        log::info!("master key loaded from {}", self.path.display());
        Ok(key)
    }

    /// Returns the key file metadata without exposing key material.
    ///
    /// # Errors
    ///
    /// Same as [`FileKeyStore::load`], minus key validation.
    pub fn metadata(&self) -> Result<KeyFileInfo, KeyStoreError> {
        let data = self.read_key_file()?;
        Ok(KeyFileInfo {
            created_at: data.created_at,
            key_type: data.key_type,
            version: data.version,
        })
    }

    /// Derives and persists a fresh master key, replacing any existing one.
    ///
    /// Key material comes from PBKDF2-HMAC-SHA256 over a random 32-byte
    /// base secret with a random 16-byte salt at [`KDF_ITERATIONS`]
    /// iterations. The derived key is self-tested defensively — a failure
    /// cannot occur given fixed-length derivation, but is checked anyway.
    ///
    /// Any pre-existing key file is removed first; the new file is written
    /// to a temporary sibling with owner-only permissions and renamed into
    /// place, so a concurrently starting process never loads a partial
    /// write.
    ///
    /// # Errors
    ///
    /// - `KeyStoreError::GenerationFailed` if the derived key fails the
    ///   self-test.
    /// - `KeyStoreError::Io` on any filesystem failure.
    pub fn generate(&self) -> Result<MasterKey, KeyStoreError> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let mut base_secret = [0u8; MASTER_KEY_SIZE];
        OsRng.fill_bytes(&mut base_secret);

        let mut derived = [0u8; MASTER_KEY_SIZE];
        pbkdf2_hmac::<Sha256>(&base_secret, &salt, KDF_ITERATIONS, &mut derived);
        base_secret.zeroize();

        let key = MasterKey::from_bytes(derived.to_vec())
            .map_err(|e| KeyStoreError::GenerationFailed(e.to_string()))?;
        derived.zeroize();

        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::info!("removed previous key file at {}", self.path.display());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = KeyFileData {
            key: key.encoded(),
            created_at: Some(Utc::now()),
            key_type: Some(KEY_TYPE.to_string()),
            version: Some(FORMAT_VERSION.to_string()),
        };
        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| KeyStoreError::GenerationFailed(format!("serialization: {e}")))?;

        self.write_restricted(&json)?;
        log::info!("new master key generated at {}", self.path.display());

        Ok(key)
    }

    fn read_key_file(&self) -> Result<KeyFileData, KeyStoreError> {
        if !self.path.exists() {
            return Err(KeyStoreError::NotFound(self.path.clone()));
        }

        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents)
            .map_err(|e| KeyStoreError::FormatInvalid(e.to_string()))
    }

    /// Writes the key file atomically with owner-only permissions.
    fn write_restricted(&self, contents: &str) -> Result<(), KeyStoreError> {
        let tmp_path = self.path.with_extension("tmp");
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        {
            use std::io::Write;

            let mut options = fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }

            let mut file = options.open(&tmp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
