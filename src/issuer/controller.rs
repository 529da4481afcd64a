//! Keeps the provisioner registry in step with issuer resources.

use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use crate::errors::{Error, Result};
use crate::provisioners::{
    self, IssuerIdentity, ProvisionerRegistry, RemoteSettings, SignContext, SignObserver,
    SignedBundle, Signer, SigningClient,
};

use super::reference::IssuerRef;
use super::spec::IssuerSpec;
use super::status::{IssuerCondition, RequestOutcome};

/// Entry point for the reconciler.
///
/// Issuer reconciles call [`IssuerController::sync_issuer`] and
/// [`IssuerController::remove_issuer`]; certificate request reconciles call
/// [`IssuerController::handle_request`] or [`IssuerController::sign`].
#[derive(Debug, Clone)]
pub struct IssuerController {
    registry: ProvisionerRegistry,
    settings: RemoteSettings,
    observer: Option<Arc<dyn SignObserver>>,
}

impl IssuerController {
    pub fn new(registry: ProvisionerRegistry) -> Self {
        Self { registry, settings: RemoteSettings::default(), observer: None }
    }

    /// HTTP settings for every client built from now on.
    pub fn with_settings(mut self, settings: RemoteSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Observer attached to every client built from now on.
    pub fn with_observer(mut self, observer: Arc<dyn SignObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &ProvisionerRegistry {
        &self.registry
    }

    /// Validate `spec`, build a client and register it under `identity`.
    ///
    /// No network I/O happens here. On failure the previous registration,
    /// if any, stays in place.
    pub fn sync_issuer(&self, identity: &IssuerIdentity, spec: &IssuerSpec) -> Result<()> {
        let span = crate::issuer_span!("sync", identity);
        let _guard = span.enter();

        if let Err(e) = spec.validate() {
            warn!(identity = %identity, error = %e, "Failed to validate issuer resource");
            return Err(e);
        }

        let client = SigningClient::with_settings(
            &spec.url,
            spec.profile.clone(),
            spec.ca_bundle.as_bytes(),
            &self.settings,
        )
        .map_err(|e| {
            error!(identity = %identity, error = %e, "Failed to initialize provisioner");
            Error::from(e)
        })?;

        let client = match &self.observer {
            Some(observer) => client.with_observer(Arc::clone(observer)),
            None => client,
        };

        let previous = self.registry.upsert(identity.clone(), Arc::new(client));
        info!(
            identity = %identity,
            endpoint = %spec.url,
            replaced = previous.is_some(),
            "Issuer verified and ready to sign certificates"
        );

        Ok(())
    }

    /// Sync and report the resulting `Ready` condition.
    pub fn reconcile_issuer(&self, identity: &IssuerIdentity, spec: &IssuerSpec) -> IssuerCondition {
        IssuerCondition::from_sync(&self.sync_issuer(identity, spec))
    }

    /// Drop the registration of a deleted issuer. Returns whether one existed.
    pub fn remove_issuer(&self, identity: &IssuerIdentity) -> bool {
        self.registry.remove(identity).is_some()
    }

    /// Sign `csr_pem` with the signer registered for `identity`.
    pub async fn sign(
        &self,
        identity: &IssuerIdentity,
        csr_pem: &[u8],
        ctx: &SignContext,
    ) -> provisioners::Result<SignedBundle> {
        let signer = self.registry.require(identity)?;
        let span = crate::sign_span!(identity, signer.profile(), signer_type = %signer.signer_type());

        signer.sign(csr_pem, ctx).instrument(span).await
    }

    /// Handle one certificate request end to end.
    ///
    /// Returns `None` when the request targets another issuer group.
    pub async fn handle_request(
        &self,
        request_namespace: &str,
        issuer_ref: &IssuerRef,
        csr_pem: &[u8],
        ctx: &SignContext,
    ) -> Option<RequestOutcome> {
        if !issuer_ref.is_ours() {
            return None;
        }

        let identity = match issuer_ref.resolve(request_namespace) {
            Ok(identity) => identity,
            Err(e) => return Some(RequestOutcome::Failed { message: e.to_string() }),
        };

        Some(RequestOutcome::from_result(self.sign(&identity, csr_pem, ctx).await))
    }
}
