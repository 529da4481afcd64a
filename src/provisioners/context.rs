//! Caller-supplied cancellation and deadline for signing calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{Result, SigningError};

/// Cancellation signal and optional deadline for one signing call.
///
/// The context never retries and never extends the call; it only cuts it
/// short with [`SigningError::Cancelled`] or [`SigningError::DeadlineExceeded`].
#[derive(Debug, Clone, Default)]
pub struct SignContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl SignContext {
    /// No cancellation, no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context cancelled together with `token` (and its parents).
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self { cancel: token, deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast when the context is already done.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SigningError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(SigningError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it completes, the context is cancelled, or the
    /// deadline passes. Cancellation wins over a simultaneous completion.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(SigningError::Cancelled),
                result = fut => result,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(SigningError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}
