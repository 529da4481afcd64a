//! CA bundle validation.
//!
//! A CA bundle is accepted when at least one certificate from it can be added
//! to a trust pool. Validation is a pure parse: no network access, no date or
//! chain checks.

use std::fmt;
use std::sync::OnceLock;

use rustls::pki_types::{pem::PemObject, CertificateDer};
use rustls::RootCertStore;
use tracing::{debug, warn};

use super::error::{Result, SigningError};

/// Trust anchors derived from a CA bundle, on top of the system roots.
#[derive(Clone)]
pub struct TrustPool {
    roots: RootCertStore,
    bundle: Vec<CertificateDer<'static>>,
    system_roots: usize,
}

impl TrustPool {
    /// Total number of trust anchors, system roots included.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of anchors that came from the system root store.
    pub fn system_roots(&self) -> usize {
        self.system_roots
    }

    /// Certificates from the bundle that were accepted as anchors, in bundle order.
    pub fn bundle_certificates(&self) -> &[CertificateDer<'static>] {
        &self.bundle
    }

    /// The complete root store, system roots included.
    pub fn roots(&self) -> &RootCertStore {
        &self.roots
    }
}

impl fmt::Debug for TrustPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustPool")
            .field("anchors", &self.roots.len())
            .field("system_roots", &self.system_roots)
            .field("bundle_certificates", &self.bundle.len())
            .finish()
    }
}

/// Parse a PEM CA bundle into a trust pool seeded from the system roots.
///
/// Fails with [`SigningError::InvalidBundle`] when no certificate from the
/// bundle could be added.
pub fn validate_ca_bundle(pem: &[u8]) -> Result<TrustPool> {
    let mut roots = RootCertStore::empty();
    let (system_roots, _) = roots.add_parsable_certificates(system_certificates().iter().cloned());

    let mut bundle = Vec::new();
    for cert in pem_certificates(pem) {
        match roots.add(cert.clone()) {
            Ok(()) => bundle.push(cert),
            Err(e) => debug!(error = %e, "Skipping unusable certificate in CA bundle"),
        }
    }

    if bundle.is_empty() {
        return Err(SigningError::invalid_bundle("no valid certificates found in CA bundle"));
    }

    debug!(
        bundle_certificates = bundle.len(),
        system_roots = system_roots,
        "Validated CA bundle"
    );

    Ok(TrustPool { roots, bundle, system_roots })
}

/// Certificate blocks of a PEM document. Malformed blocks are skipped.
fn pem_certificates(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    CertificateDer::pem_slice_iter(pem)
        .filter_map(|item| match item {
            Ok(cert) => Some(cert),
            Err(e) => {
                warn!(error = %e, "Skipping malformed PEM block in CA bundle");
                None
            }
        })
        .collect()
}

/// System root certificates, loaded once per process. Empty when unavailable.
fn system_certificates() -> &'static [CertificateDer<'static>] {
    static SYSTEM_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

    SYSTEM_ROOTS.get_or_init(|| {
        let loaded = rustls_native_certs::load_native_certs();
        for e in &loaded.errors {
            debug!(error = %e, "Failed to load system root certificates");
        }
        loaded.certs
    })
}
