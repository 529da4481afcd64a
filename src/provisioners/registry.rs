//! Concurrent registry of signers keyed by issuer identity.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use super::error::{Result, SigningError};
use super::identity::IssuerIdentity;
use super::signer::Signer;

/// Maps issuer identities to the signer currently configured for them.
///
/// Cloning is cheap and clones share the same entries. Independent registries
/// are created with [`ProvisionerRegistry::new`].
///
/// Writes to one identity are linearized, so the last upsert wins and every
/// later lookup observes it. Writes to different identities never interfere.
/// Lookups hand out `Arc` clones, so replacing or removing an entry never
/// invalidates a signer a caller already holds.
#[derive(Clone, Default)]
pub struct ProvisionerRegistry {
    signers: Arc<DashMap<IssuerIdentity, Arc<dyn Signer>>>,
}

impl std::fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionerRegistry").field("issuers", &self.signers.len()).finish()
    }
}

impl ProvisionerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `signer` to `identity`, returning the signer it replaced.
    pub fn upsert(&self, identity: IssuerIdentity, signer: Arc<dyn Signer>) -> Option<Arc<dyn Signer>> {
        info!(
            identity = %identity,
            signer_type = %signer.signer_type(),
            endpoint = %signer.endpoint(),
            "Registering signer"
        );
        self.signers.insert(identity, signer)
    }

    /// Current signer for `identity`, if any.
    pub fn lookup(&self, identity: &IssuerIdentity) -> Option<Arc<dyn Signer>> {
        self.signers.get(identity).map(|entry| Arc::clone(entry.value()))
    }

    /// Current signer for `identity`, or [`SigningError::NotFound`].
    pub fn require(&self, identity: &IssuerIdentity) -> Result<Arc<dyn Signer>> {
        self.lookup(identity).ok_or_else(|| {
            debug!(identity = %identity, "No signer registered");
            SigningError::not_found(identity)
        })
    }

    /// Unbind `identity`, returning the removed signer.
    pub fn remove(&self, identity: &IssuerIdentity) -> Option<Arc<dyn Signer>> {
        let removed = self.signers.remove(identity).map(|(_, signer)| signer);
        if removed.is_some() {
            info!(identity = %identity, "Removed signer");
        }
        removed
    }

    pub fn contains(&self, identity: &IssuerIdentity) -> bool {
        self.signers.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Snapshot of the registered identities, in no particular order.
    pub fn identities(&self) -> Vec<IssuerIdentity> {
        self.signers.iter().map(|entry| entry.key().clone()).collect()
    }
}
