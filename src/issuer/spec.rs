//! Issuer resource specification.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Error, Result};

/// Configuration shared by namespaced and cluster issuers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSpec {
    /// CFSSL endpoint, `scheme://host[:port]` or a bare `host[:port]`
    #[validate(length(min = 1, message = "spec.url cannot be empty"))]
    pub url: String,

    /// PEM CA chain, ordered so that the root comes last
    #[validate(length(min = 1, message = "spec.caBundle cannot be empty"))]
    pub ca_bundle: String,

    /// CFSSL signing profile; unset means the server default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl IssuerSpec {
    /// Reject specs a signing client cannot be built from.
    ///
    /// Reports the first failing field, URL before CA bundle.
    pub fn validate(&self) -> Result<()> {
        let errors = match Validate::validate(self) {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };

        let fields = errors.field_errors();
        for field in ["url", "ca_bundle"] {
            let message = fields
                .get(field)
                .and_then(|errs| errs.first())
                .and_then(|e| e.message.as_ref());
            if let Some(message) = message {
                return Err(Error::validation_field(message.to_string(), field));
            }
        }

        Err(Error::from(errors))
    }
}
