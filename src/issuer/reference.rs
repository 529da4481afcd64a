//! Issuer references carried by certificate requests.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::provisioners::IssuerIdentity;

/// API group of the issuer resources served by this crate.
pub const ISSUER_GROUP: &str = "certmanager.thg.io";
/// Kind of the namespaced issuer resource.
pub const ISSUER_KIND: &str = "CfsslIssuer";
/// Kind of the cluster-scoped issuer resource.
pub const CLUSTER_ISSUER_KIND: &str = "CfsslClusterIssuer";

/// The `issuerRef` of a certificate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub kind: String,
    pub name: String,
}

impl IssuerRef {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self { group: group.into(), kind: kind.into(), name: name.into() }
    }

    /// Whether the request targets one of our issuers at all.
    pub fn is_ours(&self) -> bool {
        self.group == ISSUER_GROUP
    }

    /// Registry key for this reference.
    ///
    /// A namespaced issuer lives in the request's namespace. A cluster issuer
    /// has no namespace, whatever namespace the request is in.
    pub fn resolve(&self, request_namespace: &str) -> Result<IssuerIdentity> {
        match self.kind.as_str() {
            ISSUER_KIND => Ok(IssuerIdentity::namespaced(request_namespace, self.name.as_str())),
            CLUSTER_ISSUER_KIND => Ok(IssuerIdentity::cluster(self.name.as_str())),
            other => Err(Error::validation_field(
                format!("unsupported issuer kind '{}'", other),
                "kind",
            )),
        }
    }
}
