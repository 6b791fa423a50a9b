//! Durable key-value storage for the session token.
//!
//! This module provides:
//! - `TokenStore`: the storage interface the controller writes through
//! - `FileTokenStore`: JSON file in the cache directory, survives restarts
//! - `KeyringTokenStore`: OS keychain via keyring
//! - `MemoryTokenStore`: in-process map for tests and throwaway sessions

pub mod file;
pub mod keychain;
pub mod memory;

use thiserror::Error;

pub use self::file::FileTokenStore;
pub use self::keychain::KeyringTokenStore;
pub use self::memory::MemoryTokenStore;

/// Key under which the session token is stored.
pub const TOKEN_KEY: &str = "token";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keychain(#[from] keyring::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Persistent string storage keyed by name.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
