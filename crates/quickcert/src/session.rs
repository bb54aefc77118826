//! Admin login gate.
//!
//! The session is a single flag in local storage under [`LOGGED_IN_KEY`]. It is
//! independent of the certificate document: logging in or out never touches
//! certificates.

use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::error::{Error, Result};
use crate::storage::{LocalStorage, LOGGED_IN_KEY};

/// Flag value meaning "logged in".
const LOGGED_IN_VALUE: &str = "true";

/// The configured administrator account.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Create credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl From<&AdminConfig> for AdminCredentials {
    fn from(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Admin session over a local storage.
#[derive(Debug)]
pub struct AdminSession<S> {
    storage: S,
    credentials: AdminCredentials,
}

impl<S: LocalStorage> AdminSession<S> {
    /// Create a session checked against `credentials`.
    #[must_use]
    pub fn new(storage: S, credentials: AdminCredentials) -> Self {
        Self {
            storage,
            credentials,
        }
    }

    /// Attempt to log in.
    ///
    /// Returns `true` and sets the flag on an exact match of both values.
    /// Otherwise returns `false` and leaves the flag as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub fn login(&self, username: &str, password: &str) -> Result<bool> {
        if !self.credentials.matches(username, password) {
            warn!("Rejected admin login attempt");
            return Ok(false);
        }
        self.storage.set_item(LOGGED_IN_KEY, LOGGED_IN_VALUE)?;
        info!("Admin logged in");
        Ok(true)
    }

    /// Clear the login flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be removed.
    pub fn logout(&self) -> Result<()> {
        self.storage.remove_item(LOGGED_IN_KEY)?;
        info!("Admin logged out");
        Ok(())
    }

    /// Whether the login flag is set. Unreadable storage counts as logged out.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        match self.storage.get_item(LOGGED_IN_KEY) {
            Ok(value) => value.as_deref() == Some(LOGGED_IN_VALUE),
            Err(e) => {
                warn!("Failed to read session flag: {}", e);
                false
            }
        }
    }

    /// Gate for admin-only operations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] if no admin is logged in.
    pub fn require_login(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(Error::NotLoggedIn)
        }
    }
}
