mod common;

use common::{leaf, root, spawn_tls_server, store_with};
use std::sync::Arc;
use tls_trustcheck::config::Settings;
use tls_trustcheck::models::{
    RevocationVerdict, Target, UntrustedReason, ValidationVerdict,
};
use tls_trustcheck::runner::{check_hosts, HostChecker};
use tls_trustcheck::trust::TrustAnchorStore;

fn settings(check_revocation: bool, allow_insecure_fallback: bool) -> Settings {
    let mut settings = Settings::default();
    settings.network.connect_timeout_secs = 5;
    settings.network.handshake_timeout_secs = 5;
    settings.checks.check_revocation = check_revocation;
    settings.trust.allow_insecure_fallback = allow_insecure_fallback;
    settings
}

#[tokio::test]
async fn test_trusted_host_report() {
    let ca = root("Runner Root", None);
    let server_cert = leaf("localhost", &ca);
    let port = spawn_tls_server(&[&server_cert, &ca], &server_cert.key).await;

    let checker = HostChecker::new(&settings(false, false), Arc::new(store_with(&[&ca]))).unwrap();
    let report = checker
        .check_host(&Target::new("localhost", port), &|_| {})
        .await
        .unwrap();

    assert_eq!(report.chain, ValidationVerdict::ChainValid);
    assert_eq!(report.certificates.len(), 2);
    assert!(report
        .certificates
        .iter()
        .all(|c| c.validity == ValidationVerdict::Valid));
    assert!(report.revocation.is_none());
    assert!(report.is_healthy());
}

#[tokio::test]
async fn test_insecure_chain_is_never_trusted() {
    let ca = root("Runner Untrusted Root", None);
    let server_cert = leaf("localhost", &ca);
    let port = spawn_tls_server(&[&server_cert, &ca], &server_cert.key).await;

    let store = TrustAnchorStore::with_bootstrap().unwrap();
    let checker = HostChecker::new(&settings(true, true), Arc::new(store)).unwrap();
    let report = checker
        .check_host(&Target::new("localhost", port), &|_| {})
        .await
        .unwrap();

    assert!(report.retrieved_insecurely);
    assert!(matches!(
        report.chain,
        ValidationVerdict::ChainUntrusted(UntrustedReason::RetrievedWithoutVerification { .. })
    ));
    // The leaf names no OCSP responder
    assert!(matches!(
        report.revocation,
        Some(RevocationVerdict::CheckFailed { .. })
    ));
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let ca = root("Batch Root", None);
    let server_cert = leaf("localhost", &ca);
    let port = spawn_tls_server(&[&server_cert], &server_cert.key).await;

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_port = closed.local_addr().unwrap().port();
    drop(closed);

    let checker = HostChecker::new(&settings(false, false), Arc::new(store_with(&[&ca]))).unwrap();
    let targets = vec![
        Target::new("localhost", port),
        Target::new("127.0.0.1", closed_port),
    ];
    let results = check_hosts(&checker, targets, 2, &|_| {}).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|(_, r)| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|(_, r)| r.is_err()).count(), 1);
}
