//! # cfssl-issuer
//!
//! Signing backend for a cert-manager external issuer backed by a CFSSL
//! signing authority.
//!
//! ## Architecture
//!
//! ```text
//! Reconciler → IssuerController → ProvisionerRegistry → SigningClient → CFSSL
//!                    ↓                                        ↓
//!             IssuerCondition /                     CSR decode, chain
//!             RequestOutcome                        reassembly, retry class
//! ```
//!
//! ## Core Components
//!
//! - **Provisioners**: CA bundle validation, the CFSSL signing client, the
//!   concurrent issuer registry, the signing pipeline and failure classification
//! - **Issuer**: spec validation, issuer reference resolution and the status
//!   outcomes a reconciler records
//! - **Config / Observability**: layered configuration and structured logging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cfssl_issuer::issuer::{IssuerController, IssuerSpec};
//! use cfssl_issuer::provisioners::{IssuerIdentity, ProvisionerRegistry, SignContext};
//!
//! # async fn run(spec: IssuerSpec, csr: Vec<u8>) -> cfssl_issuer::Result<()> {
//! let controller = IssuerController::new(ProvisionerRegistry::new());
//! let identity = IssuerIdentity::namespaced("default", "cfssl");
//!
//! controller.sync_issuer(&identity, &spec)?;
//! let bundle = controller.sign(&identity, &csr, &SignContext::background()).await?;
//! println!("{}", String::from_utf8_lossy(&bundle.leaf_certificate));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod issuer;
pub mod observability;
pub mod provisioners;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use provisioners::{is_retryable, IssuerIdentity, ProvisionerRegistry, SignedBundle, Signer, SigningError};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
