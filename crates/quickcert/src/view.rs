//! Student-facing certificate view.

use crate::config::QrConfig;
use crate::error::Result;
use crate::qr::QrCode;
use crate::record::Certificate;
use crate::storage::LocalStorage;
use crate::store::CertificateStore;

/// Message shown for a missing or unresolvable certificate.
pub const NO_CERTIFICATE_MESSAGE: &str =
    "No certificate found. Please check your verification details.";

/// Message shown when a credential lookup fails for any reason.
pub const LOOKUP_FAILED_MESSAGE: &str =
    "Invalid username or password, or no certificate is registered under this name.";

/// What the certificate view displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateView {
    /// The certificate exists.
    Found(Certificate),
    /// No key was given, or it matched nothing.
    NoCertificate,
}

/// Resolve a view key against the store.
///
/// An absent or empty key and an unknown key all yield
/// [`CertificateView::NoCertificate`].
pub fn resolve<S: LocalStorage>(store: &CertificateStore<S>, key: Option<&str>) -> CertificateView {
    key.filter(|key| !key.is_empty())
        .and_then(|key| store.get(key))
        .map_or(CertificateView::NoCertificate, CertificateView::Found)
}

impl CertificateView {
    /// The certificate, if one was found.
    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Found(certificate) => Some(certificate),
            Self::NoCertificate => None,
        }
    }

    /// Render as plain text, including the QR verification text and image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the QR image URL cannot be built.
    pub fn render(&self, qr: &QrConfig) -> Result<String> {
        let Self::Found(certificate) = self else {
            return Ok(NO_CERTIFICATE_MESSAGE.to_string());
        };

        let code = QrCode::for_certificate(certificate);
        let image_url = code.image_url(qr)?;

        let mut out = format!(
            "{title}\n{underline}\n\
             Recipient:  {recipient}\n\
             Degree:     {degree}\n\
             Issuer:     {issuer}\n\
             Date:       {date}\n\n\
             [QR code]\n",
            title = certificate.title,
            underline = "=".repeat(certificate.title.chars().count()),
            recipient = certificate.recipient,
            degree = certificate.degree,
            issuer = certificate.issuer,
            date = certificate.date,
        );
        for line in code.data().lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("  ");
        out.push_str(image_url.as_str());
        Ok(out)
    }
}
