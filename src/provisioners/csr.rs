//! Certificate signing request decoding.

use rustls::pki_types::{pem::PemObject, CertificateSigningRequestDer};
use x509_parser::prelude::{FromDer, X509CertificationRequest};

use super::error::{Result, SigningError};

/// A PEM-encoded PKCS#10 request that decoded successfully.
///
/// Only the encoding is checked. Subject and SAN policy is left to the
/// signing authority.
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pem: String,
    der: CertificateSigningRequestDer<'static>,
}

impl CertificateRequest {
    /// Decode and parse a PEM certificate request.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(pem)
            .map_err(|_| SigningError::invalid_csr("request is not valid UTF-8 PEM"))?;

        let der = CertificateSigningRequestDer::from_pem_slice(pem)
            .map_err(|e| SigningError::invalid_csr(format!("failed to decode CSR: {}", e)))?;

        X509CertificationRequest::from_der(der.as_ref())
            .map_err(|e| SigningError::invalid_csr(format!("failed to validate CSR: {}", e)))?;

        Ok(Self { pem: text.to_string(), der })
    }

    /// The request exactly as supplied by the caller.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    pub fn der(&self) -> &[u8] {
        self.der.as_ref()
    }
}
