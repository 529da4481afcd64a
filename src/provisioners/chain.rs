//! Certificate chain decoding and reassembly.

use pem::{EncodeConfig, LineEnding, Pem};
use rustls::pki_types::{pem::PemObject, CertificateDer};

use super::error::{Result, SigningError};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Result of a successful signing operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedBundle {
    /// PEM chain: the signed leaf followed by every intermediate.
    pub leaf_certificate: Vec<u8>,
    /// PEM of the top-most certificate of the CA bundle.
    pub root_ca: Vec<u8>,
}

/// Decode every certificate of a PEM document as X.509.
///
/// `what` names the document in error messages. Any malformed block, any
/// certificate that is not valid X.509, or an empty document fails with
/// [`SigningError::Decode`].
pub fn decode_certificates(pem: &[u8], what: &str) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SigningError::decode(what, e.to_string()))?;

    if certs.is_empty() {
        return Err(SigningError::decode(what, "no certificates found"));
    }

    for cert in &certs {
        x509_parser::parse_x509_certificate(cert.as_ref())
            .map_err(|e| SigningError::decode(what, e.to_string()))?;
    }

    Ok(certs)
}

/// Build the client-facing bundle from the signed leaf and the CA chain.
///
/// The CA chain is ordered so that its last certificate is the root. The
/// leaf output is `leaf + ca_chain[..n-1]`, the root output is `ca_chain[n-1]`,
/// both freshly PEM-encoded.
pub fn assemble(
    leaf: CertificateDer<'static>,
    mut ca_chain: Vec<CertificateDer<'static>>,
) -> Result<SignedBundle> {
    let root =
        ca_chain.pop().ok_or_else(|| SigningError::decode("CA bundle", "no certificates found"))?;

    let mut chain = Vec::with_capacity(ca_chain.len() + 1);
    chain.push(leaf);
    chain.extend(ca_chain);

    Ok(SignedBundle {
        leaf_certificate: encode_certificates(&chain),
        root_ca: encode_certificates(std::slice::from_ref(&root)),
    })
}

/// PEM-encode certificates back to back, LF line endings, 64 column body.
pub fn encode_certificates(certs: &[CertificateDer<'_>]) -> Vec<u8> {
    certs
        .iter()
        .map(|cert| {
            let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
            pem::encode_config(&Pem::new(CERTIFICATE_TAG, cert.as_ref()), config)
        })
        .collect::<String>()
        .into_bytes()
}
