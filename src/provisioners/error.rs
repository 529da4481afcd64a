//! Error types for signing operations.

use thiserror::Error;

use super::cfssl::CfsslApiError;

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors that can occur while building a signer or signing a request.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The CA bundle did not contain a single usable certificate.
    #[error("Invalid CA bundle: {reason}")]
    InvalidBundle { reason: String },

    /// The certificate signing request could not be decoded.
    #[error("Invalid certificate request: {reason}")]
    InvalidCsr { reason: String },

    /// The signing endpoint is not a usable URL.
    #[error("Invalid signing endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The remote signing authority failed or rejected the request.
    #[error("Failed to sign certificate by cfssl: {source}")]
    RemoteSign {
        #[source]
        source: RemoteError,
    },

    /// The signed certificate or the stored CA bundle is not valid X.509 data.
    #[error("Failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    /// No signer is registered for the issuer.
    #[error("Signer for issuer {identity} not found")]
    NotFound { identity: String },

    /// The caller cancelled the signing call.
    #[error("Signing was cancelled")]
    Cancelled,

    /// The caller's deadline passed before the signing call completed.
    #[error("Signing deadline exceeded")]
    DeadlineExceeded,
}

impl SigningError {
    /// Create an invalid bundle error.
    pub fn invalid_bundle(reason: impl Into<String>) -> Self {
        Self::InvalidBundle { reason: reason.into() }
    }

    /// Create an invalid CSR error.
    pub fn invalid_csr(reason: impl Into<String>) -> Self {
        Self::InvalidCsr { reason: reason.into() }
    }

    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint { endpoint: endpoint.into(), reason: reason.into() }
    }

    /// Create a decode error.
    pub fn decode(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode { what: what.into(), reason: reason.into() }
    }

    /// Create a not found error.
    pub fn not_found(identity: impl ToString) -> Self {
        Self::NotFound { identity: identity.to_string() }
    }

    /// Whether this failure is worth retrying later. See [`super::is_retryable`].
    pub fn is_retryable(&self) -> bool {
        super::classify::is_retryable(self)
    }
}

impl From<RemoteError> for SigningError {
    fn from(source: RemoteError) -> Self {
        Self::RemoteSign { source }
    }
}

/// Failure of the remote signing call itself.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The HTTP exchange failed (connect, TLS, I/O, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The signing authority answered with a structured error.
    #[error("{0}")]
    Api(#[from] CfsslApiError),

    /// The signing authority answered with something that is not a CFSSL envelope.
    #[error("malformed response: {0}")]
    Protocol(String),
}
