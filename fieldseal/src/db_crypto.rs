//! Process-lifetime binding adapter for the persistence layer.
//!
//! A [`DatabaseCrypto`] gives callers that do not manage a
//! [`CryptoManager`] directly — typically a persistence field codec — one
//! long-lived handle, bound exactly once per process. The engine is passed
//! in explicitly; there is no ambient global state to reach into.
//!
//! The adapter has two observable states: unbound (every operation fails
//! with [`Error::NotInitialized`]) and bound (all operations available).
//! The transition happens once and is irreversible; a process restart is
//! the only way back.

use crate::error::Error;
use crate::manager::CryptoManager;
use crate::value::FieldValue;
use std::sync::{Arc, OnceLock};

/// Long-lived crypto handle for persistence-layer callers.
///
/// Cheap to share: the engine lives behind an [`Arc`], and binding state
/// behind a [`OnceLock`], so a single adapter serves arbitrary concurrent
/// read/write paths without locking.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fieldseal::db_crypto::DatabaseCrypto;
/// use fieldseal::manager::CryptoManager;
/// use fieldseal::master_key::MasterKey;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = MasterKey::from_bytes(vec![7u8; 32])?;
/// let db_crypto = DatabaseCrypto::new(Arc::new(CryptoManager::new(key)));
///
/// let token = db_crypto.encrypt_value("reactor_3_pressure")?;
/// let value = db_crypto.decrypt_value(&token)?;
/// # Ok(())
/// # }
/// ```
pub struct DatabaseCrypto {
    engine: OnceLock<Arc<CryptoManager>>,
}

impl DatabaseCrypto {
    /// Creates an adapter already bound to an engine.
    #[must_use]
    pub fn new(engine: Arc<CryptoManager>) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(engine);
        Self { engine: slot }
    }

    /// Creates an unbound adapter for deferred initialization.
    ///
    /// Every operation fails with [`Error::NotInitialized`] until
    /// [`DatabaseCrypto::bind`] is called.
    #[must_use]
    pub fn unbound() -> Self {
        Self { engine: OnceLock::new() }
    }

    /// Binds the adapter to an engine. Happens at most once.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyBound` if an engine is already bound; the
    /// existing binding is left untouched.
    pub fn bind(&self, engine: Arc<CryptoManager>) -> Result<(), Error> {
        self.engine.set(engine).map_err(|_| Error::AlreadyBound)?;
        log::info!("database crypto bound to engine");
        Ok(())
    }

    /// Returns whether the adapter has been bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Encrypts a value through the bound engine.
    ///
    /// Numeric inputs need no stringification here: the engine's tagged
    /// value model carries them natively.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` before binding; otherwise any engine error,
    /// logged and returned unchanged — never swallowed.
    pub fn encrypt_value(&self, value: impl Into<FieldValue>) -> Result<Vec<u8>, Error> {
        let engine = self.engine.get().ok_or(Error::NotInitialized)?;
        engine.encrypt(&value.into()).map_err(|e| {
            log::error!("failed to encrypt value: {e}");
            e
        })
    }

    /// Decrypts a token through the bound engine.
    ///
    /// A failed decryption always propagates; the raw encrypted value is
    /// never handed back in place of plaintext.
    ///
    /// # Errors
    ///
    /// `Error::NotInitialized` before binding; otherwise any engine error,
    /// logged and returned unchanged.
    pub fn decrypt_value(&self, token: &[u8]) -> Result<FieldValue, Error> {
        let engine = self.engine.get().ok_or(Error::NotInitialized)?;
        engine.decrypt(token).map_err(|e| {
            log::error!("failed to decrypt value: {e}");
            e
        })
    }
}
