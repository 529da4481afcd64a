//! # Observability
//!
//! Structured logging for the issuer. Signing attempts are additionally
//! reported through [`crate::provisioners::SignObserver`].

pub mod logging;

pub use logging::{init_logging, log_config_info};
