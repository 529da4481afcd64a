use std::sync::Mutex;
use std::time::Duration;

use cfssl_issuer::provisioners::{SignObserver, SignOutcome};
use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair};
use rustls::pki_types::CertificateDer;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SIGN_PATH: &str = "/api/v1/cfssl/sign";

pub const ROOT_PEM: &str = include_str!("../fixtures/root.pem");
pub const INTERMEDIATE_PEM: &str = include_str!("../fixtures/intermediate.pem");
pub const CA_BUNDLE_PEM: &str = include_str!("../fixtures/ca-bundle.pem");
pub const CLIENT_PEM: &str = include_str!("../fixtures/client.pem");
pub const CLIENT_CSR: &str = include_str!("../fixtures/client.csr");

pub const POLICY_REJECTION_BODY: &str = r#"{"success":false,"result":null,"errors":[{"code":5300,"message":"Request does not match policy whitelist"}],"messages":[]}"#;

/// CFSSL success envelope around `certificate`.
pub fn signed_response(certificate: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "result": { "certificate": certificate },
        "errors": [],
        "messages": []
    }))
}

/// CFSSL failure envelope with a single error.
pub fn failed_response(status: u16, code: i32, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "success": false,
        "result": null,
        "errors": [{ "code": code, "message": message }],
        "messages": []
    }))
}

/// Mock CFSSL server that signs every request with `certificate`.
pub async fn cfssl_returning(certificate: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_PATH))
        .respond_with(signed_response(certificate))
        .mount(&server)
        .await;
    server
}

/// Mock CFSSL server that answers every request with `response`.
pub async fn cfssl_responding(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path(SIGN_PATH)).respond_with(response).mount(&server).await;
    server
}

/// Mock CFSSL server that stalls long enough for any test deadline to pass.
pub async fn cfssl_stalled() -> MockServer {
    cfssl_responding(signed_response(CLIENT_PEM).set_delay(Duration::from_secs(30))).await
}

/// Generated CA chain, ordered issuing CA first and root last.
pub struct TestChain {
    certs: Vec<(Certificate, KeyPair)>,
}

impl TestChain {
    /// A chain of `depth` CAs, each signed by the next; the last is self-signed.
    pub fn new(depth: usize) -> anyhow::Result<Self> {
        assert!(depth >= 1, "a chain needs a root");

        let mut certs: Vec<(Certificate, KeyPair)> = Vec::with_capacity(depth);
        for level in (0..depth).rev() {
            let key = KeyPair::generate()?;
            let mut params = CertificateParams::new(vec![])?;
            params.distinguished_name.push(DnType::CommonName, format!("Test CA {level}"));
            params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);

            let cert = match certs.last() {
                Some((issuer, issuer_key)) => params.signed_by(&key, issuer, issuer_key)?,
                None => params.self_signed(&key)?,
            };
            certs.push((cert, key));
        }
        certs.reverse();

        Ok(Self { certs })
    }

    pub fn bundle_pem(&self) -> String {
        self.certs.iter().map(|(cert, _)| cert.pem()).collect()
    }

    pub fn ders(&self) -> Vec<CertificateDer<'static>> {
        self.certs.iter().map(|(cert, _)| cert.der().clone()).collect()
    }

    /// A leaf issued by the first CA of the chain.
    pub fn issue_leaf(&self, dns_name: &str) -> anyhow::Result<Certificate> {
        let (issuer, issuer_key) = &self.certs[0];
        let key = KeyPair::generate()?;
        let params = CertificateParams::new(vec![dns_name.to_string()])?;
        Ok(params.signed_by(&key, issuer, issuer_key)?)
    }
}

/// Fresh PEM certificate request for `dns_name`.
pub fn generate_csr(dns_name: &str) -> anyhow::Result<String> {
    let key = KeyPair::generate()?;
    let params = CertificateParams::new(vec![dns_name.to_string()])?;
    Ok(params.serialize_request(&key)?.pem()?)
}

/// Observer that records the outcome of every attempt.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    outcomes: Mutex<Vec<(Option<String>, bool)>>,
}

impl RecordingObserver {
    /// `(profile, succeeded)` per attempt, in order.
    pub fn outcomes(&self) -> Vec<(Option<String>, bool)> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl SignObserver for RecordingObserver {
    fn on_sign(&self, profile: Option<&str>, _elapsed: Duration, outcome: SignOutcome<'_>) {
        self.outcomes.lock().unwrap().push((profile.map(str::to_string), outcome.is_success()));
    }
}
