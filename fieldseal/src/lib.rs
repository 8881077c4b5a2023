//! # `fieldseal`
//!
//! Transparent field-level encryption for stored values. Each value is
//! encrypted independently into a self-contained authenticated token; any
//! tampering or wrong-key use is detected on decryption rather than
//! silently accepted.
//!
//! ## Features
//!
//! - AEAD encryption (ChaCha20-Poly1305) with per-call random nonces
//! - Typed values (text, integers, floats, JSON trees, raw binary) with
//!   the type decided at encryption time and authenticated with the data
//! - Master key validated at load, held immutably for the process lifetime
//! - Lock-free sharing: one engine instance serves arbitrary concurrent
//!   read/write paths
//!
//! ## Example
//!
//! ```rust,ignore
//! use fieldseal::prelude::*;
//! use fieldseal_key_file::FileKeyStore;
//!
//! let key = FileKeyStore::new("./instance/.master.key").load()?;
//! let engine = CryptoManager::new(key);
//!
//! let token = engine.encrypt(&FieldValue::from("alice@example.com"))?;
//! let value = engine.decrypt(&token)?;
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod db_crypto;
pub mod error;
pub mod manager;
pub mod master_key;
pub mod token;
pub mod value;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::db_crypto::DatabaseCrypto;
    pub use crate::error::{Error, KeyStoreError};
    pub use crate::manager::CryptoManager;
    pub use crate::master_key::MasterKey;
    pub use crate::value::FieldValue;
}
