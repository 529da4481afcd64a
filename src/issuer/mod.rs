//! # Issuer Glue
//!
//! The narrow surface a cluster reconciler calls into: issuer resource specs,
//! issuer references from certificate requests, the controller that keeps the
//! provisioner registry in sync, and the status outcomes it reports back.
//! Nothing here talks to a cluster API.

pub mod controller;
pub mod reference;
pub mod spec;
pub mod status;

pub use controller::IssuerController;
pub use reference::{IssuerRef, CLUSTER_ISSUER_KIND, ISSUER_GROUP, ISSUER_KIND};
pub use spec::IssuerSpec;
pub use status::{is_terminal_failure, ConditionStatus, IssuerCondition, RequestOutcome};
