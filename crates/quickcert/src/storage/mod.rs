//! Client-local key-value storage for quickcert.
//!
//! Everything quickcert persists goes through the [`LocalStorage`] trait: a
//! flat mapping from string keys to string values. The certificate document and
//! the admin login flag each live under their own key.
//!
//! Two backends are provided:
//! - [`SqliteStorage`]: a single `SQLite` file in the user's data directory.
//! - [`MemoryStorage`]: an in-process map, used by tests.

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, StorageStats};

use crate::error::Result;

/// Key under which the certificate document is stored.
pub const CERTIFICATES_KEY: &str = "certificates";

/// Key under which the admin login flag is stored.
pub const LOGGED_IN_KEY: &str = "session.logged_in";

/// A string key-value store scoped to one local profile.
///
/// Each call is atomic on its own. There is no multi-key transaction: callers
/// that need two changes to land together must fold them into one value.
pub trait LocalStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}
