//! Retryability classification for signing failures.

use std::error::Error as StdError;

use super::cfssl::CfsslApiError;

/// Whether retrying the failed operation later may succeed.
///
/// Every failure is treated as transient except a CFSSL policy allow-list
/// rejection (API client category, client HTTP error reason, "policy
/// whitelist" message). The error's whole source chain is inspected, so a
/// rejection wrapped by a caller's own error type is still recognized.
pub fn is_retryable(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(api) = e.downcast_ref::<CfsslApiError>() {
            if api.is_policy_rejection() {
                return false;
            }
        }
        current = e.source();
    }
    true
}
