//! # Structured Logging
//!
//! Subscriber setup and span macros built on the tracing ecosystem.
//! `RUST_LOG` always overrides the configured level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Create a tracing span for one signing request.
///
/// Carries a fresh `request_id`, the issuer identity and the profile. Extra
/// fields may follow:
///
/// ```rust,ignore
/// let span = sign_span!(identity, profile, csr_bytes = csr.len());
/// ```
#[macro_export]
macro_rules! sign_span {
    ($identity:expr, $profile:expr) => {
        tracing::info_span!(
            "sign_request",
            identity = %$identity,
            profile = $profile.unwrap_or(""),
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($identity:expr, $profile:expr, $($field:tt)*) => {
        tracing::info_span!(
            "sign_request",
            identity = %$identity,
            profile = $profile.unwrap_or(""),
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for issuer registry operations.
#[macro_export]
macro_rules! issuer_span {
    ($operation:expr, $identity:expr) => {
        tracing::debug_span!(
            "issuer_operation",
            operation = %$operation,
            identity = %$identity,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
}

/// Install the global subscriber.
///
/// Returns an error when a global subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json_logging {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        log_level = %config.observability.log_level,
        json_logging = config.observability.json_logging,
        connect_timeout_seconds = ?config.client.connect_timeout_seconds,
        user_agent = %config.client.user_agent,
        "cfssl-issuer configuration"
    );
}
