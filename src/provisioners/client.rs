//! CFSSL-backed signer.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::bundle::{validate_ca_bundle, TrustPool};
use super::cfssl::{CfsslRemote, RemoteSettings};
use super::chain::SignedBundle;
use super::context::SignContext;
use super::error::Result;
use super::observer::{SignObserver, TracingObserver};
use super::pipeline;
use super::signer::{Signer, SignerType};

/// One configured remote signing authority.
///
/// Immutable after construction. A changed issuer configuration produces a new
/// client that replaces this one in the registry; in-flight calls holding this
/// client finish against the old configuration.
pub struct SigningClient {
    endpoint: String,
    profile: Option<String>,
    ca_bundle: Vec<u8>,
    trust: TrustPool,
    remote: CfsslRemote,
    observer: Arc<dyn SignObserver>,
}

impl fmt::Debug for SigningClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningClient")
            .field("endpoint", &self.endpoint)
            .field("profile", &self.profile)
            .field("trust", &self.trust)
            .field("sign_url", &self.remote.sign_url().as_str())
            .finish()
    }
}

impl SigningClient {
    /// Build a client for `url` trusting only the certificates of `ca_bundle_pem`.
    ///
    /// Purely local: the bundle is parsed and the HTTP client is configured,
    /// but no connection is made. An empty `profile` means the server default.
    ///
    /// # Errors
    ///
    /// - `SigningError::InvalidBundle` if the bundle holds no usable certificate
    /// - `SigningError::InvalidEndpoint` if `url` cannot be turned into a signing URL
    pub fn new(url: &str, profile: Option<String>, ca_bundle_pem: &[u8]) -> Result<Self> {
        Self::with_settings(url, profile, ca_bundle_pem, &RemoteSettings::default())
    }

    /// Like [`SigningClient::new`] with explicit HTTP settings.
    pub fn with_settings(
        url: &str,
        profile: Option<String>,
        ca_bundle_pem: &[u8],
        settings: &RemoteSettings,
    ) -> Result<Self> {
        let trust = validate_ca_bundle(ca_bundle_pem)?;
        let remote = CfsslRemote::new(url, &trust, settings)?;
        let profile = profile.filter(|p| !p.is_empty());

        debug!(
            endpoint = %url,
            sign_url = %remote.sign_url(),
            profile = ?profile,
            "Created cfssl signing client"
        );

        Ok(Self {
            endpoint: url.to_string(),
            profile,
            ca_bundle: ca_bundle_pem.to_vec(),
            trust,
            remote,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replace the default tracing observer.
    pub fn with_observer(mut self, observer: Arc<dyn SignObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Raw PEM of the CA bundle the client was built from.
    pub fn ca_bundle(&self) -> &[u8] {
        &self.ca_bundle
    }

    pub fn trust_pool(&self) -> &TrustPool {
        &self.trust
    }

    pub(crate) fn remote(&self) -> &CfsslRemote {
        &self.remote
    }

    pub(crate) fn observer(&self) -> &dyn SignObserver {
        self.observer.as_ref()
    }
}

#[async_trait]
impl Signer for SigningClient {
    async fn sign(&self, csr_pem: &[u8], ctx: &SignContext) -> Result<SignedBundle> {
        pipeline::sign(self, csr_pem, ctx).await
    }

    fn signer_type(&self) -> SignerType {
        SignerType::Cfssl
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}
