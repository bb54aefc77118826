//! Certificate records and the admin form they are created from.
//!
//! A [`Certificate`] is one issued certificate plus the credentials its student
//! uses to retrieve it. The student username doubles as the storage key.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder stored when a certificate is saved without a degree.
pub const DEFAULT_DEGREE: &str = "Unspecified";

/// One issued certificate.
///
/// Field names are serialized in camelCase to match the stored document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Certificate title.
    pub title: String,
    /// Name of the person the certificate is issued to.
    pub recipient: String,
    /// Degree or grade; may be empty on input.
    #[serde(default)]
    pub degree: String,
    /// Issuing organisation.
    pub issuer: String,
    /// Issue date. Free-form; not parsed.
    pub date: String,
    /// Unique student identifier and storage key.
    pub student_username: String,
    /// Student verification password, compared verbatim.
    pub student_password: String,
}

impl Certificate {
    /// Check that every required field is non-empty.
    ///
    /// Fields are checked in form order and the first empty one is reported.
    /// Values are not trimmed: a single space counts as present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first empty required field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("recipient", &self.recipient),
            ("issuer", &self.issuer),
            ("date", &self.date),
            ("student username", &self.student_username),
            ("student password", &self.student_password),
        ];
        match required.into_iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(Error::missing_field(field)),
            None => Ok(()),
        }
    }

    /// Replace an empty degree with `default`.
    #[must_use]
    pub fn with_default_degree(mut self, default: &str) -> Self {
        if self.degree.is_empty() {
            self.degree = default.to_string();
        }
        self
    }
}

/// Raw field values as submitted by the administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateForm {
    /// Certificate title.
    pub title: String,
    /// Recipient name.
    pub recipient: String,
    /// Degree; optional.
    pub degree: String,
    /// Issuing organisation.
    pub issuer: String,
    /// Issue date.
    pub date: String,
    /// Student username.
    pub student_username: String,
    /// Student password.
    pub student_password: String,
}

impl CertificateForm {
    /// Validate the form into a certificate.
    ///
    /// The degree is left as submitted; normalization happens when the
    /// certificate is saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if a required field is empty.
    pub fn validate(self) -> Result<Certificate> {
        let certificate = Certificate {
            title: self.title,
            recipient: self.recipient,
            degree: self.degree,
            issuer: self.issuer,
            date: self.date,
            student_username: self.student_username,
            student_password: self.student_password,
        };
        certificate.validate()?;
        Ok(certificate)
    }
}

impl From<&Certificate> for CertificateForm {
    fn from(certificate: &Certificate) -> Self {
        Self {
            title: certificate.title.clone(),
            recipient: certificate.recipient.clone(),
            degree: certificate.degree.clone(),
            issuer: certificate.issuer.clone(),
            date: certificate.date.clone(),
            student_username: certificate.student_username.clone(),
            student_password: certificate.student_password.clone(),
        }
    }
}
