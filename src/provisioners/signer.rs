//! The signing capability and its test doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::chain::SignedBundle;
use super::context::SignContext;
use super::csr::CertificateRequest;
use super::error::{RemoteError, Result};

/// Kind of signer bound to an issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerType {
    /// Remote CFSSL signing authority
    Cfssl,
    /// Accepts everything, signs nothing
    Noop,
    /// Deterministic test double
    Mock,
}

impl SignerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cfssl => "cfssl",
            Self::Noop => "noop",
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for SignerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something that can turn a CSR into a signed certificate bundle.
///
/// Implementations are immutable once constructed and shared through
/// `Arc<dyn Signer>`, so a signer pulled from the registry stays valid for the
/// whole call even if the registry entry is replaced or removed meanwhile.
#[async_trait]
pub trait Signer: Send + Sync + std::fmt::Debug {
    /// Sign a PEM-encoded PKCS#10 request.
    ///
    /// # Errors
    ///
    /// - `SigningError::InvalidCsr` if the request cannot be decoded (no remote call is made)
    /// - `SigningError::RemoteSign` if the signing authority fails or rejects the request
    /// - `SigningError::Decode` if the signed certificate or the CA bundle is not X.509
    /// - `SigningError::Cancelled` / `SigningError::DeadlineExceeded` when `ctx` is done first
    async fn sign(&self, csr_pem: &[u8], ctx: &SignContext) -> Result<SignedBundle>;

    fn signer_type(&self) -> SignerType;

    /// Endpoint the signer talks to, as configured.
    fn endpoint(&self) -> &str;

    /// Signing profile sent with every request, if any.
    fn profile(&self) -> Option<&str>;
}

/// Signer that returns an empty bundle for every request and never fails.
#[derive(Debug, Clone, Default)]
pub struct NoopSigner {
    endpoint: String,
}

impl NoopSigner {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

#[async_trait]
impl Signer for NoopSigner {
    async fn sign(&self, _csr_pem: &[u8], _ctx: &SignContext) -> Result<SignedBundle> {
        Ok(SignedBundle::default())
    }

    fn signer_type(&self) -> SignerType {
        SignerType::Noop
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn profile(&self) -> Option<&str> {
        None
    }
}

/// Deterministic signer for tests.
///
/// Returns the configured bundle for every valid CSR. `set_fail_next(true)`
/// makes the next call fail with a remote error.
#[derive(Debug, Default)]
pub struct MockSigner {
    endpoint: String,
    profile: Option<String>,
    bundle: SignedBundle,
    fail_next: AtomicBool,
    calls: AtomicUsize,
}

impl MockSigner {
    pub fn new(endpoint: impl Into<String>, bundle: SignedBundle) -> Self {
        Self { endpoint: endpoint.into(), bundle, ..Self::default() }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into()).filter(|p: &String| !p.is_empty());
        self
    }

    pub fn set_fail_next(&self, fail: bool) {
        self.fail_next.store(fail, Ordering::SeqCst);
    }

    /// Number of calls that reached the signer, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Signer for MockSigner {
    async fn sign(&self, csr_pem: &[u8], ctx: &SignContext) -> Result<SignedBundle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        CertificateRequest::from_pem(csr_pem)?;

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RemoteError::Protocol("mock signer failure".to_string()).into());
        }

        Ok(self.bundle.clone())
    }

    fn signer_type(&self) -> SignerType {
        SignerType::Mock
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}
