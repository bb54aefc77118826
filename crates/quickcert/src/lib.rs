//! `quickcert` - Local certificate issuance and verification
//!
//! An administrator logs in and issues certificates keyed by student username.
//! Students later retrieve their certificate, with a QR verification code, by
//! presenting the matching username and password. All state lives in a
//! client-local key-value storage.
//!
//! ```
//! use quickcert::{Certificate, CertificateStore, MemoryStorage};
//!
//! let store = CertificateStore::new(MemoryStorage::new());
//! store
//!     .save(Certificate {
//!         title: "Cert A".into(),
//!         recipient: "Alice".into(),
//!         degree: String::new(),
//!         issuer: "Org".into(),
//!         date: "2024-01-01".into(),
//!         student_username: "alice01".into(),
//!         student_password: "pw1".into(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.lookup("alice01", "pw1").unwrap().degree, "Unspecified");
//! assert!(store.lookup("alice01", "wrong").is_none());
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod qr;
pub mod record;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use qr::{verification_text, QrCode};
pub use record::{Certificate, CertificateForm, DEFAULT_DEGREE};
pub use session::{AdminCredentials, AdminSession};
pub use storage::{LocalStorage, MemoryStorage, SqliteStorage, StorageStats};
pub use store::CertificateStore;
pub use view::CertificateView;
