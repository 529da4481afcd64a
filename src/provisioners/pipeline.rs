//! The signing pipeline: CSR in, client-ready certificate bundle out.

use std::time::Instant;

use tracing::debug;

use super::cfssl::SignRequest;
use super::chain::{assemble, decode_certificates, SignedBundle};
use super::client::SigningClient;
use super::context::SignContext;
use super::csr::CertificateRequest;
use super::error::{Result, SigningError};
use super::observer::SignOutcome;
use super::signer::Signer;

/// Sign `csr_pem` with `client`.
///
/// 1. Decode the CSR; a malformed request fails before any remote call.
/// 2. Send it with the client's profile (omitted when empty).
/// 3. Await the remote call under `ctx`. No deadline is added here.
/// 4. Decode the signed certificate and the client's CA bundle.
/// 5. Return `leaf + bundle[..n-1]` as the leaf chain and `bundle[n-1]` as the root.
///
/// The client's observer is notified once for every call that reached step 2.
pub async fn sign(client: &SigningClient, csr_pem: &[u8], ctx: &SignContext) -> Result<SignedBundle> {
    let csr = CertificateRequest::from_pem(csr_pem)?;
    let profile = client.profile();
    let request = SignRequest::new(csr.pem(), profile);

    let started = Instant::now();
    let result = remote_sign(client, &request, ctx).await;

    match &result {
        Ok(_) => client.observer().on_sign(profile, started.elapsed(), SignOutcome::Success),
        Err(e) => client.observer().on_sign(profile, started.elapsed(), SignOutcome::Failure(e)),
    }

    result
}

async fn remote_sign(
    client: &SigningClient,
    request: &SignRequest<'_>,
    ctx: &SignContext,
) -> Result<SignedBundle> {
    let certificate = ctx
        .run(async { client.remote().sign(request).await.map_err(SigningError::from) })
        .await?;

    let leaf = decode_certificates(certificate.as_bytes(), "signed certificate")?
        .into_iter()
        .next()
        .ok_or_else(|| SigningError::decode("signed certificate", "no certificates found"))?;
    let ca_chain = decode_certificates(client.ca_bundle(), "CA bundle")?;

    debug!(intermediates = ca_chain.len().saturating_sub(1), "Assembling signed certificate chain");

    assemble(leaf, ca_chain)
}
