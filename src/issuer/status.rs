//! Status outcomes reported back to the reconciler.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::provisioners::{SignedBundle, SigningError};

/// Status of a `Ready` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
}

/// `Ready` condition of an issuer resource after a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerCondition {
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
}

impl IssuerCondition {
    pub const REASON_VERIFIED: &'static str = "Verified";
    pub const REASON_VALIDATION: &'static str = "Validation";
    pub const REASON_ERROR: &'static str = "Error";

    /// The issuer is registered and ready to sign.
    pub fn verified() -> Self {
        Self {
            status: ConditionStatus::True,
            reason: Self::REASON_VERIFIED.to_string(),
            message: "CfsslIssuer verified and ready to sign certificates".to_string(),
        }
    }

    /// The spec was rejected before a client was built.
    pub fn validation(error: &Error) -> Self {
        let message = match error {
            Error::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            status: ConditionStatus::False,
            reason: Self::REASON_VALIDATION.to_string(),
            message: format!("Failed to validate resource: {}", message),
        }
    }

    /// A client could not be built from a valid-looking spec.
    pub fn error(error: &Error) -> Self {
        Self {
            status: ConditionStatus::False,
            reason: Self::REASON_ERROR.to_string(),
            message: format!("failed to initialize provisioner: {}", error),
        }
    }

    /// Condition for the result of a sync.
    pub fn from_sync(result: &Result<(), Error>) -> Self {
        match result {
            Ok(()) => Self::verified(),
            Err(e @ Error::Validation { .. }) => Self::validation(e),
            Err(e) => Self::error(e),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Whether a signing failure should be recorded as permanent.
///
/// Malformed input and misconfiguration are terminal. Missing issuers and
/// interruptions are not. Remote failures follow [`SigningError::is_retryable`].
pub fn is_terminal_failure(error: &SigningError) -> bool {
    match error {
        SigningError::InvalidCsr { .. }
        | SigningError::InvalidBundle { .. }
        | SigningError::InvalidEndpoint { .. }
        | SigningError::Decode { .. } => true,
        SigningError::RemoteSign { .. } => !error.is_retryable(),
        SigningError::NotFound { .. } | SigningError::Cancelled | SigningError::DeadlineExceeded => false,
    }
}

/// What the reconciler should record on a certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Signed; store the chain and the root CA.
    Issued(SignedBundle),
    /// Not done yet; retry later.
    Pending { message: String },
    /// Permanently failed; do not retry.
    Failed { message: String },
}

impl RequestOutcome {
    /// Map a signing result onto a request outcome. See [`is_terminal_failure`].
    pub fn from_result(result: Result<SignedBundle, SigningError>) -> Self {
        let error = match result {
            Ok(bundle) => return Self::Issued(bundle),
            Err(error) => error,
        };

        match &error {
            SigningError::NotFound { identity } => {
                Self::Pending { message: format!("CfsslIssuer resource {} is not Ready", identity) }
            }
            _ if is_terminal_failure(&error) => Self::failed(&error),
            SigningError::Cancelled | SigningError::DeadlineExceeded => {
                Self::Pending { message: format!("Signing interrupted: {}", error) }
            }
            _ => Self::Pending {
                message: format!("Failed to sign certificate request, will retry: {}", error),
            },
        }
    }

    fn failed(error: &SigningError) -> Self {
        Self::Failed { message: format!("Failed to sign certificate request: {}", error) }
    }

    /// cert-manager condition reason for this outcome.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Issued(_) => "Issued",
            Self::Pending { .. } => "Pending",
            Self::Failed { .. } => "Failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Issued(_) => "Certificate Issued",
            Self::Pending { message } | Self::Failed { message } => message,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}
