//! # Provisioners
//!
//! The signing core of the issuer: everything between "an issuer identity and
//! a CSR" and "a signed leaf chain plus root CA".
//!
//! - [`validate_ca_bundle`] turns a PEM bundle into a [`TrustPool`]
//! - [`SigningClient`] wraps one CFSSL endpoint and implements [`Signer`]
//! - [`ProvisionerRegistry`] maps [`IssuerIdentity`] values to live signers
//! - [`sign`] runs the signing pipeline for a client
//! - [`is_retryable`] tells a caller whether a failure is worth retrying
//!
//! ```rust,ignore
//! use cfssl_issuer::provisioners::{IssuerIdentity, ProvisionerRegistry, SignContext, SigningClient};
//!
//! let registry = ProvisionerRegistry::new();
//! let client = SigningClient::new("https://cfssl:8888", Some("client".into()), &ca_bundle)?;
//! registry.upsert(IssuerIdentity::namespaced("default", "cfssl"), Arc::new(client));
//!
//! let signer = registry.require(&IssuerIdentity::namespaced("default", "cfssl"))?;
//! match signer.sign(&csr, &SignContext::background()).await {
//!     Ok(bundle) => store(bundle.leaf_certificate, bundle.root_ca),
//!     Err(e) if e.is_retryable() => requeue(),
//!     Err(e) => fail(e),
//! }
//! ```
//!
//! The core never retries on its own and spawns no tasks.

mod bundle;
mod chain;
mod classify;
mod client;
mod context;
mod csr;
mod identity;
mod observer;
mod pipeline;
mod registry;
mod signer;

pub mod cfssl;
pub mod error;

pub use bundle::{validate_ca_bundle, TrustPool};
pub use chain::{assemble, decode_certificates, encode_certificates, SignedBundle};
pub use cfssl::{normalize_endpoint, ApiClientReason, CfsslApiError, ErrorCategory, ErrorCode, RemoteSettings};
pub use classify::is_retryable;
pub use client::SigningClient;
pub use context::SignContext;
pub use csr::CertificateRequest;
pub use error::{RemoteError, Result, SigningError};
pub use identity::{IssuerIdentity, IssuerScope};
pub use observer::{SignObserver, SignOutcome, TracingObserver};
pub use pipeline::sign;
pub use registry::ProvisionerRegistry;
pub use signer::{MockSigner, NoopSigner, Signer, SignerType};
