//! Configuration management for quickcert.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::record::DEFAULT_DEGREE;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "quickcert";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "storage.db";

/// Default QR image service.
const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Largest QR image edge, in pixels, accepted by the service.
const MAX_QR_SIZE: u32 = 1000;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `QUICKCERT_`, sections split on `__`)
/// 2. TOML config file at `~/.config/quickcert/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Administrator account.
    pub admin: AdminConfig,
    /// Certificate defaults.
    pub certificates: CertificateConfig,
    /// QR code rendering.
    pub qr: QrConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/quickcert/storage.db`
    pub database_path: Option<PathBuf>,
}

/// Administrator account. Compared in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin login name.
    pub username: String,
    /// Admin password.
    pub password: String,
}

/// Certificate-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    /// Placeholder stored when a certificate has no degree.
    pub default_degree: String,
}

/// QR code configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrConfig {
    /// Base URL of the QR image service.
    pub service_url: String,
    /// Edge length of the square QR image in pixels.
    pub size: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            default_degree: DEFAULT_DEGREE.to_string(),
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_QR_SERVICE_URL.to_string(),
            size: 180,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("QUICKCERT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin.username and admin.password must not be empty".to_string(),
            });
        }

        if self.certificates.default_degree.is_empty() {
            return Err(Error::ConfigValidation {
                message: "certificates.default_degree must not be empty".to_string(),
            });
        }

        if self.qr.size == 0 || self.qr.size > MAX_QR_SIZE {
            return Err(Error::ConfigValidation {
                message: format!(
                    "qr.size must be between 1 and {MAX_QR_SIZE}, got {}",
                    self.qr.size
                ),
            });
        }

        if let Err(e) = Url::parse(&self.qr.service_url) {
            return Err(Error::ConfigValidation {
                message: format!("qr.service_url is not a valid URL: {e}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// A copy safe to display: the admin password is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.admin.password = "********".to_string();
        config
    }
}
