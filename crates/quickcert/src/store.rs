//! The certificate store.
//!
//! All certificates live in one JSON document, `{ studentUsername: Certificate }`,
//! stored under [`CERTIFICATES_KEY`]. Every mutation is a read-modify-write of
//! the whole document followed by exactly one `set_item`, so a reader of the
//! storage never observes a half-applied change.
//!
//! Reads never fail. A missing, unreadable or corrupt document is treated as an
//! empty store and logged. Mutations replace a corrupt document but return the
//! error when the document cannot be read at all.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::record::{Certificate, CertificateForm, DEFAULT_DEGREE};
use crate::storage::{LocalStorage, CERTIFICATES_KEY};

/// The persisted document: student username to certificate.
type Document = BTreeMap<String, Certificate>;

/// Durable CRUD over certificates, keyed by student username.
#[derive(Debug)]
pub struct CertificateStore<S> {
    storage: S,
    default_degree: String,
}

impl<S: LocalStorage> CertificateStore<S> {
    /// Create a store over `storage` using [`DEFAULT_DEGREE`].
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_default_degree(storage, DEFAULT_DEGREE)
    }

    /// Create a store that fills empty degrees with `default_degree`.
    #[must_use]
    pub fn with_default_degree(storage: S, default_degree: impl Into<String>) -> Self {
        Self {
            storage,
            default_degree: default_degree.into(),
        }
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Every certificate, ordered by student username.
    #[must_use]
    pub fn list_all(&self) -> Vec<Certificate> {
        self.load().into_values().collect()
    }

    /// Number of stored certificates.
    #[must_use]
    pub fn count(&self) -> usize {
        self.load().len()
    }

    /// Exact-match lookup by student username.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<Certificate> {
        self.load().remove(username)
    }

    /// Insert or fully overwrite the certificate at its student username.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`](crate::error::Error::MissingField) if a
    /// required field is empty, leaving the store untouched, or a storage
    /// error if the document cannot be read or written.
    pub fn save(&self, certificate: Certificate) -> Result<()> {
        self.put(None, certificate).map(|_| ())
    }

    /// Move a certificate from `old` to `new` in one document write.
    ///
    /// The stored record's student username is set to `new`. When `old` and
    /// `new` are equal this is the same as [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`](crate::error::Error::MissingField) if a
    /// required field is empty, leaving the store untouched, or a storage
    /// error if the document cannot be read or written.
    pub fn rename(&self, old: &str, new: &str, certificate: Certificate) -> Result<()> {
        self.put(Some(old), Self::aligned(new, certificate)).map(|_| ())
    }

    /// Remove the certificate for `username`.
    ///
    /// Returns `true` if a certificate was removed, `false` if none existed.
    /// Deleting an absent username does not touch storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn delete(&self, username: &str) -> Result<bool> {
        let mut document = self.load_for_write()?;
        if document.remove(username).is_none() {
            debug!("No certificate to delete for {}", username);
            return Ok(false);
        }
        self.store(&document)?;
        info!("Deleted certificate for {}", username);
        Ok(true)
    }

    /// Credential-gated read for students.
    ///
    /// Returns the certificate only if `username` exists and `password` equals
    /// its student password exactly. An unknown username and a wrong password
    /// give the same `None`.
    #[must_use]
    pub fn lookup(&self, username: &str, password: &str) -> Option<Certificate> {
        let found = self
            .get(username)
            .filter(|certificate| certificate.student_password == password);
        if found.is_none() {
            debug!("Certificate lookup failed");
        }
        found
    }

    /// Apply an admin form submission and return the stored certificate.
    ///
    /// With `editing` unset this creates (or overwrites) a certificate. With
    /// `editing` set to the original username, the certificate is saved in
    /// place or renamed if the form changed the username.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`](crate::error::Error::MissingField) if the
    /// form is incomplete, or a storage error if the document cannot be read
    /// or written.
    pub fn submit(&self, form: CertificateForm, editing: Option<&str>) -> Result<Certificate> {
        self.put(editing, form.validate()?)
    }

    fn aligned(username: &str, mut certificate: Certificate) -> Certificate {
        if certificate.student_username != username {
            debug!("Aligning certificate username with new key {}", username);
            certificate.student_username = username.to_string();
        }
        certificate
    }

    /// Validate, normalize and write `certificate` under its username,
    /// removing the entry at `old` in the same write.
    fn put(&self, old: Option<&str>, certificate: Certificate) -> Result<Certificate> {
        certificate.validate()?;
        let certificate = certificate.with_default_degree(&self.default_degree);
        let username = certificate.student_username.clone();

        let mut document = self.load_for_write()?;
        let old = old.filter(|old| *old != username);
        if let Some(old) = old {
            document.remove(old);
        }
        let replaced = document
            .insert(username.clone(), certificate.clone())
            .is_some();
        self.store(&document)?;

        match old {
            Some(old) => info!("Renamed certificate {} to {}", old, username),
            None if replaced => info!("Updated certificate for {}", username),
            None => info!("Created certificate for {}", username),
        }
        Ok(certificate)
    }

    fn load(&self) -> Document {
        self.load_for_write().unwrap_or_else(|e| {
            warn!("Failed to read certificates, treating store as empty: {}", e);
            Document::new()
        })
    }

    /// Read the document ahead of a mutation. A corrupt document reads as
    /// empty; a storage read failure is an error.
    fn load_for_write(&self) -> Result<Document> {
        let Some(raw) = self.storage.get_item(CERTIFICATES_KEY)? else {
            return Ok(Document::new());
        };

        match serde_json::from_str(&raw) {
            Ok(document) => Ok(document),
            Err(e) => {
                warn!("Certificate document is corrupt, treating store as empty: {}", e);
                Ok(Document::new())
            }
        }
    }

    fn store(&self, document: &Document) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.storage.set_item(CERTIFICATES_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStorage;

    fn create_test_store() -> CertificateStore<MemoryStorage> {
        crate::logging::init_test_logging();
        CertificateStore::new(MemoryStorage::new())
    }

    fn sample(username: &str, password: &str) -> Certificate {
        Certificate {
            title: "Cert A".to_string(),
            recipient: "Alice".to_string(),
            degree: "BSc".to_string(),
            issuer: "Org".to_string(),
            date: "2024-01-01".to_string(),
            student_username: username.to_string(),
            student_password: password.to_string(),
        }
    }

    #[test]
    fn test_list_all_empty() {
        let store = create_test_store();
        assert!(store.list_all().is_empty());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_save_and_get() {
        let store = create_test_store();
        let cert = sample("alice01", "pw1");

        store.save(cert.clone()).unwrap();

        assert_eq!(store.get("alice01"), Some(cert));
    }

    #[test]
    fn test_get_is_exact_match() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        assert!(store.get("Alice01").is_none());
        assert!(store.get(" alice01").is_none());
    }

    #[test]
    fn test_save_overwrites_without_merge() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let mut updated = sample("alice01", "pw2");
        updated.title = "Cert B".to_string();
        updated.degree = String::new();
        store.save(updated).unwrap();

        let stored = store.get("alice01").unwrap();
        assert_eq!(stored.title, "Cert B");
        assert_eq!(stored.student_password, "pw2");
        assert_eq!(stored.degree, DEFAULT_DEGREE);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_save_normalizes_empty_degree() {
        let store = create_test_store();
        let mut cert = sample("alice01", "pw1");
        cert.degree = String::new();

        store.save(cert).unwrap();

        assert_eq!(store.get("alice01").unwrap().degree, "Unspecified");
    }

    #[test]
    fn test_custom_default_degree() {
        let store = CertificateStore::with_default_degree(MemoryStorage::new(), "N/A");
        let mut cert = sample("alice01", "pw1");
        cert.degree = String::new();

        store.save(cert).unwrap();

        assert_eq!(store.get("alice01").unwrap().degree, "N/A");
    }

    #[test]
    fn test_save_invalid_leaves_store_untouched() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();
        let writes = store.storage().write_count();

        let mut invalid = sample("bob", "pw");
        invalid.date = String::new();
        let err = store.save(invalid).unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(store.storage().write_count(), writes);
        assert!(store.get("bob").is_none());
    }

    #[test]
    fn test_lookup_scenario() {
        let store = create_test_store();
        let mut cert = sample("alice01", "pw1");
        cert.degree = String::new();
        store.save(cert.clone()).unwrap();

        let found = store.lookup("alice01", "pw1").unwrap();
        assert_eq!(found.degree, DEFAULT_DEGREE);
        assert_eq!(found.title, cert.title);

        assert!(store.lookup("alice01", "wrong").is_none());
    }

    #[test]
    fn test_lookup_failures_are_indistinguishable() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let unknown = store.lookup("nobody", "pw1");
        let wrong = store.lookup("alice01", "PW1");
        assert_eq!(unknown, wrong);
        assert!(unknown.is_none());
    }

    #[test]
    fn test_delete() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        assert!(store.delete("alice01").unwrap());
        assert!(store.get("alice01").is_none());
    }

    #[test]
    fn test_delete_nonexistent_is_noop() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();
        let writes = store.storage().write_count();

        assert!(!store.delete("nobody").unwrap());
        assert_eq!(store.storage().write_count(), writes);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_rename_scenario() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let edited = sample("alice02", "pw1");
        store.rename("alice01", "alice02", edited.clone()).unwrap();

        assert!(store.get("alice01").is_none());
        assert_eq!(store.get("alice02"), Some(edited));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_rename_writes_once() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();
        let writes = store.storage().write_count();

        store
            .rename("alice01", "alice02", sample("alice02", "pw1"))
            .unwrap();

        assert_eq!(store.storage().write_count(), writes + 1);
    }

    #[test]
    fn test_rename_aligns_username_with_key() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        store
            .rename("alice01", "alice02", sample("alice01", "pw1"))
            .unwrap();

        assert_eq!(store.get("alice02").unwrap().student_username, "alice02");
        assert!(store.get("alice01").is_none());
    }

    #[test]
    fn test_rename_same_key_is_save() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        store
            .rename("alice01", "alice01", sample("alice01", "pw9"))
            .unwrap();

        assert_eq!(store.get("alice01").unwrap().student_password, "pw9");
    }

    #[test]
    fn test_rename_invalid_leaves_old_entry() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let mut invalid = sample("alice02", "pw1");
        invalid.title = String::new();
        assert!(store.rename("alice01", "alice02", invalid).is_err());

        assert!(store.get("alice01").is_some());
        assert!(store.get("alice02").is_none());
    }

    #[test]
    fn test_rename_onto_existing_username_overwrites() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();
        store.save(sample("bob", "pw2")).unwrap();

        store.rename("alice01", "bob", sample("bob", "pw1")).unwrap();

        assert_eq!(store.count(), 1);
        assert_eq!(store.get("bob").unwrap().student_password, "pw1");
    }

    #[test]
    fn test_corrupt_document_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(CERTIFICATES_KEY, "{not json").unwrap();
        let store = CertificateStore::new(storage);

        assert!(store.list_all().is_empty());
        assert!(store.get("alice01").is_none());
        assert!(store.lookup("alice01", "pw1").is_none());

        store.save(sample("alice01", "pw1")).unwrap();
        assert_eq!(store.count(), 1);
    }

    /// Storage whose reads can be switched to fail, as a locked database would.
    struct UnreadableStorage {
        inner: MemoryStorage,
        fail_reads: std::cell::Cell<bool>,
    }

    impl LocalStorage for UnreadableStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads.get() {
                return Err(Error::DatabaseQuery(rusqlite::Error::InvalidQuery));
            }
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    fn create_unreadable_store() -> CertificateStore<UnreadableStorage> {
        crate::logging::init_test_logging();
        let store = CertificateStore::new(UnreadableStorage {
            inner: MemoryStorage::new(),
            fail_reads: std::cell::Cell::new(false),
        });
        store.save(sample("alice01", "pw1")).unwrap();
        store.save(sample("bob", "pw2")).unwrap();
        store
    }

    #[test]
    fn test_failed_read_aborts_mutations() {
        let store = create_unreadable_store();
        let writes = store.storage().inner.write_count();

        store.storage().fail_reads.set(true);
        assert!(store.save(sample("carol", "pw3")).is_err());
        assert!(store
            .rename("alice01", "alice02", sample("alice02", "pw1"))
            .is_err());
        assert!(store.delete("bob").is_err());
        let form = CertificateForm::from(&sample("carol", "pw3"));
        assert!(store.submit(form, None).is_err());
        assert_eq!(store.storage().inner.write_count(), writes);

        store.storage().fail_reads.set(false);
        assert_eq!(store.count(), 2);
        assert!(store.get("alice01").is_some());
        assert!(store.get("bob").is_some());
    }

    #[test]
    fn test_failed_read_is_empty_for_readers() {
        let store = create_unreadable_store();

        store.storage().fail_reads.set(true);
        assert!(store.list_all().is_empty());
        assert!(store.lookup("alice01", "pw1").is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_submit_returns_normalized_record() {
        let store = create_test_store();
        let mut form = CertificateForm::from(&sample("alice01", "pw1"));
        form.degree = String::new();

        let stored = store.submit(form, None).unwrap();

        assert_eq!(stored.degree, DEFAULT_DEGREE);
        assert_eq!(store.get("alice01"), Some(stored));
    }

    #[test]
    fn test_document_layout() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let raw = store.storage().get_item(CERTIFICATES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["alice01"]["studentUsername"], "alice01");
        assert_eq!(value["alice01"]["studentPassword"], "pw1");
        assert_eq!(value["alice01"]["title"], "Cert A");
    }

    #[test]
    fn test_list_all_returns_every_record() {
        let store = create_test_store();
        store.save(sample("carol", "c")).unwrap();
        store.save(sample("alice01", "a")).unwrap();
        store.save(sample("bob", "b")).unwrap();

        let usernames: Vec<String> = store
            .list_all()
            .into_iter()
            .map(|c| c.student_username)
            .collect();
        assert_eq!(usernames, vec!["alice01", "bob", "carol"]);
    }

    #[test]
    fn test_submit_create() {
        let store = create_test_store();
        let form = CertificateForm::from(&sample("alice01", "pw1"));

        let stored = store.submit(form, None).unwrap();

        assert_eq!(stored, sample("alice01", "pw1"));
    }

    #[test]
    fn test_submit_edit_with_rename() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let mut form = CertificateForm::from(&store.get("alice01").unwrap());
        form.student_username = "alice02".to_string();
        store.submit(form, Some("alice01")).unwrap();

        assert!(store.get("alice01").is_none());
        assert!(store.get("alice02").is_some());
    }

    #[test]
    fn test_submit_edit_in_place() {
        let store = create_test_store();
        store.save(sample("alice01", "pw1")).unwrap();

        let mut form = CertificateForm::from(&store.get("alice01").unwrap());
        form.recipient = "Alice Smith".to_string();
        let stored = store.submit(form, Some("alice01")).unwrap();

        assert_eq!(stored.recipient, "Alice Smith");
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_submit_incomplete_form() {
        let store = create_test_store();
        let form = CertificateForm {
            title: "Cert".to_string(),
            ..CertificateForm::default()
        };

        let err = store.submit(form, None).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "recipient" }));
        assert!(store.storage().is_empty());
    }
}
