use cfssl_issuer::issuer::{
    IssuerController, IssuerRef, IssuerSpec, RequestOutcome, CLUSTER_ISSUER_KIND, ISSUER_GROUP,
    ISSUER_KIND,
};
use cfssl_issuer::provisioners::{IssuerIdentity, ProvisionerRegistry, SignContext, SignedBundle};
use wiremock::ResponseTemplate;

use super::support::*;

fn spec(url: &str) -> IssuerSpec {
    IssuerSpec { url: url.to_string(), ca_bundle: CA_BUNDLE_PEM.to_string(), profile: Some("client".into()) }
}

fn issued(outcome: Option<RequestOutcome>) -> SignedBundle {
    match outcome {
        Some(RequestOutcome::Issued(bundle)) => bundle,
        other => panic!("expected an issued certificate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_namespaced_issuer_end_to_end() {
    let server = cfssl_returning(CLIENT_PEM).await;
    let controller = IssuerController::new(ProvisionerRegistry::new());

    let condition =
        controller.reconcile_issuer(&IssuerIdentity::namespaced("team-a", "cfssl"), &spec(&server.uri()));
    assert!(condition.is_ready());

    let reference = IssuerRef::new(ISSUER_GROUP, ISSUER_KIND, "cfssl");
    let ctx = SignContext::background();

    let bundle = issued(controller.handle_request("team-a", &reference, CLIENT_CSR.as_bytes(), &ctx).await);
    assert_eq!(
        String::from_utf8(bundle.leaf_certificate).unwrap(),
        format!("{}{}", CLIENT_PEM, INTERMEDIATE_PEM)
    );
    assert_eq!(String::from_utf8(bundle.root_ca).unwrap(), ROOT_PEM);

    let elsewhere = controller.handle_request("team-b", &reference, CLIENT_CSR.as_bytes(), &ctx).await;
    assert_eq!(elsewhere.map(|o| o.reason()), Some("Pending"));
}

#[tokio::test]
async fn test_cluster_issuer_serves_every_namespace() {
    let server = cfssl_returning(CLIENT_PEM).await;
    let controller = IssuerController::new(ProvisionerRegistry::new());
    controller.sync_issuer(&IssuerIdentity::cluster("cfssl"), &spec(&server.uri())).unwrap();

    let reference = IssuerRef::new(ISSUER_GROUP, CLUSTER_ISSUER_KIND, "cfssl");
    let ctx = SignContext::background();

    for namespace in ["team-a", "team-b", "kube-system"] {
        issued(controller.handle_request(namespace, &reference, CLIENT_CSR.as_bytes(), &ctx).await);
    }
}

#[tokio::test]
async fn test_resync_switches_endpoint() {
    let first = cfssl_responding(ResponseTemplate::new(500)).await;
    let second = cfssl_returning(CLIENT_PEM).await;
    let controller = IssuerController::new(ProvisionerRegistry::new());
    let id = IssuerIdentity::namespaced("default", "cfssl");
    let reference = IssuerRef::new(ISSUER_GROUP, ISSUER_KIND, "cfssl");
    let ctx = SignContext::background();

    controller.sync_issuer(&id, &spec(&first.uri())).unwrap();
    let outcome = controller.handle_request("default", &reference, CLIENT_CSR.as_bytes(), &ctx).await;
    assert_eq!(outcome.map(|o| o.reason()), Some("Pending"));

    controller.sync_issuer(&id, &spec(&second.uri())).unwrap();
    issued(controller.handle_request("default", &reference, CLIENT_CSR.as_bytes(), &ctx).await);

    assert_eq!(first.received_requests().await.unwrap().len(), 1);
    assert_eq!(second.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_policy_rejection_fails_request() {
    let server =
        cfssl_responding(ResponseTemplate::new(400).set_body_string(POLICY_REJECTION_BODY)).await;
    let controller = IssuerController::new(ProvisionerRegistry::new());
    controller.sync_issuer(&IssuerIdentity::namespaced("default", "cfssl"), &spec(&server.uri())).unwrap();

    let reference = IssuerRef::new(ISSUER_GROUP, ISSUER_KIND, "cfssl");
    let outcome = controller
        .handle_request("default", &reference, CLIENT_CSR.as_bytes(), &SignContext::background())
        .await
        .expect("handled");

    assert_eq!(outcome.reason(), "Failed");
    assert!(outcome.is_terminal());
    assert!(outcome.message().contains("policy whitelist"));
}

#[tokio::test]
async fn test_deleted_issuer_leaves_requests_pending() {
    let server = cfssl_returning(CLIENT_PEM).await;
    let controller = IssuerController::new(ProvisionerRegistry::new());
    let id = IssuerIdentity::namespaced("default", "cfssl");
    controller.sync_issuer(&id, &spec(&server.uri())).unwrap();
    assert!(controller.remove_issuer(&id));

    let reference = IssuerRef::new(ISSUER_GROUP, ISSUER_KIND, "cfssl");
    let outcome = controller
        .handle_request("default", &reference, CLIENT_CSR.as_bytes(), &SignContext::background())
        .await
        .expect("handled");

    assert_eq!(outcome.message(), "CfsslIssuer resource default/cfssl is not Ready");
    assert!(server.received_requests().await.unwrap().is_empty());
}
