use std::sync::Arc;
use std::time::Duration;

use cfssl_issuer::provisioners::{
    encode_certificates, RemoteSettings, SignContext, Signer, SigningClient, SigningError,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer};

use super::support::*;

#[tokio::test]
async fn test_sign_with_two_certificate_bundle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_PATH))
        .and(body_json(json!({ "certificate_request": CLIENT_CSR, "profile": "client" })))
        .respond_with(signed_response(CLIENT_PEM))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        SigningClient::new(&server.uri(), Some("client".into()), CA_BUNDLE_PEM.as_bytes()).unwrap();
    let bundle = client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();

    assert_eq!(
        String::from_utf8(bundle.leaf_certificate).unwrap(),
        format!("{}{}", CLIENT_PEM, INTERMEDIATE_PEM)
    );
    assert_eq!(String::from_utf8(bundle.root_ca).unwrap(), ROOT_PEM);
}

#[tokio::test]
async fn test_sign_with_single_certificate_bundle() {
    let server = cfssl_returning(CLIENT_PEM).await;

    let client = SigningClient::new(&server.uri(), None, ROOT_PEM.as_bytes()).unwrap();
    let bundle = client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();

    assert_eq!(String::from_utf8(bundle.leaf_certificate).unwrap(), CLIENT_PEM);
    assert_eq!(String::from_utf8(bundle.root_ca).unwrap(), ROOT_PEM);
}

#[tokio::test]
async fn test_sign_with_generated_chains() {
    for depth in 1..=4 {
        let chain = TestChain::new(depth).unwrap();
        let leaf = chain.issue_leaf("svc.example.com").unwrap();
        let server = cfssl_returning(&leaf.pem()).await;

        let client = SigningClient::new(&server.uri(), None, chain.bundle_pem().as_bytes()).unwrap();
        let csr = generate_csr("svc.example.com").unwrap();
        let bundle = client.sign(csr.as_bytes(), &SignContext::background()).await.unwrap();

        let ders = chain.ders();
        let (root, intermediates) = ders.split_last().unwrap();
        let mut expected_chain = vec![leaf.der().clone()];
        expected_chain.extend(intermediates.iter().cloned());

        assert_eq!(bundle.leaf_certificate, encode_certificates(&expected_chain), "depth {depth}");
        assert_eq!(bundle.root_ca, encode_certificates(std::slice::from_ref(root)), "depth {depth}");
    }
}

#[tokio::test]
async fn test_output_is_reencoded() {
    let server = cfssl_returning(&CLIENT_PEM.replace('\n', "\r\n")).await;
    let sloppy_bundle = format!("\n\n{}\n{}", INTERMEDIATE_PEM, ROOT_PEM).replace('\n', "\r\n");

    let client = SigningClient::new(&server.uri(), None, sloppy_bundle.as_bytes()).unwrap();
    let bundle = client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();

    assert_eq!(
        String::from_utf8(bundle.leaf_certificate).unwrap(),
        format!("{}{}", CLIENT_PEM, INTERMEDIATE_PEM)
    );
    assert_eq!(String::from_utf8(bundle.root_ca).unwrap(), ROOT_PEM);
}

#[tokio::test]
async fn test_empty_profile_is_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_PATH))
        .and(body_json(json!({ "certificate_request": CLIENT_CSR })))
        .respond_with(signed_response(CLIENT_PEM))
        .expect(2)
        .mount(&server)
        .await;

    for profile in [None, Some(String::new())] {
        let client = SigningClient::new(&server.uri(), profile, CA_BUNDLE_PEM.as_bytes()).unwrap();
        client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();
    }
}

#[tokio::test]
async fn test_malformed_csr_makes_no_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SIGN_PATH))
        .respond_with(signed_response(CLIENT_PEM))
        .expect(0)
        .mount(&server)
        .await;

    let observer = Arc::new(RecordingObserver::default());
    let client = SigningClient::new(&server.uri(), None, CA_BUNDLE_PEM.as_bytes())
        .unwrap()
        .with_observer(observer.clone());

    for csr in [&b"not a csr"[..], &b""[..], CLIENT_PEM.as_bytes()] {
        let err = client.sign(csr, &SignContext::background()).await.unwrap_err();
        assert!(matches!(err, SigningError::InvalidCsr { .. }), "got {err:?}");
    }

    assert!(observer.outcomes().is_empty());
}

#[tokio::test]
async fn test_empty_bundle_rejected_at_construction() {
    let err = SigningClient::new("http://mock", Some("client".into()), b"").unwrap_err();
    assert!(matches!(err, SigningError::InvalidBundle { .. }));
}

#[tokio::test]
async fn test_garbage_certificate_is_decode_error() {
    let server = cfssl_returning("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n").await;

    let client = SigningClient::new(&server.uri(), None, CA_BUNDLE_PEM.as_bytes()).unwrap();
    let err = client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap_err();

    assert!(matches!(err, SigningError::Decode { ref what, .. } if what == "signed certificate"));
}

#[tokio::test]
async fn test_observer_sees_each_remote_attempt() {
    let server = cfssl_returning(CLIENT_PEM).await;
    let observer = Arc::new(RecordingObserver::default());
    let client = SigningClient::new(&server.uri(), Some("client".into()), CA_BUNDLE_PEM.as_bytes())
        .unwrap()
        .with_observer(observer.clone());

    client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();

    let cancelled = SignContext::background();
    cancelled.cancel();
    client.sign(CLIENT_CSR.as_bytes(), &cancelled).await.unwrap_err();

    assert_eq!(
        observer.outcomes(),
        vec![(Some("client".to_string()), true), (Some("client".to_string()), false)]
    );
}

#[tokio::test]
async fn test_cancellation_returns_promptly() {
    let server = cfssl_stalled().await;
    let client = SigningClient::new(&server.uri(), None, CA_BUNDLE_PEM.as_bytes()).unwrap();

    let token = CancellationToken::new();
    let ctx = SignContext::with_cancellation(token.clone());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(Duration::from_secs(5), client.sign(CLIENT_CSR.as_bytes(), &ctx))
        .await
        .expect("sign returned after cancellation")
        .unwrap_err();

    assert!(matches!(err, SigningError::Cancelled));
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let server = cfssl_stalled().await;
    let client = SigningClient::new(&server.uri(), None, CA_BUNDLE_PEM.as_bytes()).unwrap();
    let ctx = SignContext::background().with_timeout(Duration::from_millis(200));

    let err = tokio::time::timeout(Duration::from_secs(5), client.sign(CLIENT_CSR.as_bytes(), &ctx))
        .await
        .expect("sign returned after deadline")
        .unwrap_err();

    assert!(matches!(err, SigningError::DeadlineExceeded));
}

#[tokio::test]
async fn test_connect_timeout_setting_is_accepted() {
    let server = cfssl_returning(CLIENT_PEM).await;
    let settings = RemoteSettings {
        connect_timeout: Some(Duration::from_secs(2)),
        user_agent: Some("cfssl-issuer-test".into()),
    };

    let client =
        SigningClient::with_settings(&server.uri(), None, CA_BUNDLE_PEM.as_bytes(), &settings).unwrap();
    client.sign(CLIENT_CSR.as_bytes(), &SignContext::background()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("user-agent").map(|v| v.to_str().unwrap()),
        Some("cfssl-issuer-test")
    );
}
