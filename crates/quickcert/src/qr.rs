//! QR verification codes.
//!
//! A certificate's QR code encodes a short plain-text summary of the public
//! fields. The image itself is rendered by an external service; this module
//! only builds the text and the service URL.

use url::Url;

use crate::config::QrConfig;
use crate::error::Result;
use crate::record::Certificate;

/// First line of every verification text.
pub const VERIFICATION_HEADER: &str = "QuickCert Verification:";

/// Build the text encoded in a certificate's QR code.
///
/// Contains title, recipient, issuer, date and student username, in that
/// order. The degree and the student password are never included.
#[must_use]
pub fn verification_text(certificate: &Certificate) -> String {
    format!(
        "{VERIFICATION_HEADER}\nTitle: {}\nRecipient: {}\nIssuer: {}\nDate: {}\nStudent Username: {}",
        certificate.title,
        certificate.recipient,
        certificate.issuer,
        certificate.date,
        certificate.student_username,
    )
}

/// A QR code request for one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    data: String,
}

impl QrCode {
    /// QR code for `certificate`.
    #[must_use]
    pub fn for_certificate(certificate: &Certificate) -> Self {
        Self {
            data: verification_text(certificate),
        }
    }

    /// The encoded text.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// URL of the rendered QR image.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Url`] if the configured service URL is invalid.
    pub fn image_url(&self, config: &QrConfig) -> Result<Url> {
        let size = format!("{0}x{0}", config.size);
        let url = Url::parse_with_params(
            &config.service_url,
            &[("size", size.as_str()), ("data", self.data.as_str())],
        )?;
        Ok(url)
    }
}
