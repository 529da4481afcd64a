//! Registry keys identifying a configured issuer resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an issuer lives in a namespace or is cluster-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuerScope {
    Namespaced,
    Cluster,
}

impl IssuerScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespaced => "namespaced",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for IssuerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of an issuer: scope, namespace and name.
///
/// Cluster-scoped identities never carry a namespace, so the same cluster
/// issuer referenced from two different namespaces resolves to one key.
/// Displays as `namespace/name`, or `<cluster>/name` for cluster issuers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssuerIdentity {
    scope: IssuerScope,
    namespace: Option<String>,
    name: String,
}

impl IssuerIdentity {
    /// Identity of a namespaced issuer.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { scope: IssuerScope::Namespaced, namespace: Some(namespace.into()), name: name.into() }
    }

    /// Identity of a cluster-scoped issuer.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self { scope: IssuerScope::Cluster, namespace: None, name: name.into() }
    }

    pub fn scope(&self) -> IssuerScope {
        self.scope
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for IssuerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "<{}>/{}", self.scope, self.name),
        }
    }
}
