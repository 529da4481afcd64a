//! # Error Handling
//!
//! Application-level errors for the issuer: configuration, resource
//! validation, I/O and signing failures. Signing errors keep their own
//! structured type ([`crate::provisioners::SigningError`]) and are wrapped here.

pub mod types;

pub use types::{Error, Result};
