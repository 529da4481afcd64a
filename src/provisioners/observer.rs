//! Notification hook for completed signing attempts.

use std::time::Duration;

use tracing::{info, warn};

use super::error::SigningError;

/// Outcome of one signing attempt, as reported to a [`SignObserver`].
#[derive(Debug, Clone, Copy)]
pub enum SignOutcome<'a> {
    Success,
    Failure(&'a SigningError),
}

impl SignOutcome<'_> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Receives one notification per signing attempt that reached the remote call.
///
/// Implementations must be cheap; they run inline on the signing path.
pub trait SignObserver: Send + Sync + std::fmt::Debug {
    fn on_sign(&self, profile: Option<&str>, elapsed: Duration, outcome: SignOutcome<'_>);
}

/// Observer that logs every attempt through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SignObserver for TracingObserver {
    fn on_sign(&self, profile: Option<&str>, elapsed: Duration, outcome: SignOutcome<'_>) {
        let profile = profile.unwrap_or("");
        let elapsed_ms = elapsed.as_millis() as u64;

        match outcome {
            SignOutcome::Success => {
                info!(profile = profile, elapsed_ms = elapsed_ms, "Certificate signed");
            }
            SignOutcome::Failure(error) => {
                warn!(
                    profile = profile,
                    elapsed_ms = elapsed_ms,
                    retryable = error.is_retryable(),
                    error = %error,
                    "Certificate signing failed"
                );
            }
        }
    }
}
