//! Runtime-generated PKI for integration tests
#![allow(dead_code)]

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, KeyPair,
};
use rustls::pki_types::CertificateDer;
use tls_trustcheck::trust::TrustAnchorStore;

/// A certificate together with the key that can issue from it
pub struct Issued {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }
}

fn params(common_name: &str, from: i32, until: i32) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = rcgen::date_time_ymd(from, 1, 1);
    params.not_after = rcgen::date_time_ymd(until, 1, 1);
    params
}

fn ca_constraint(path_len: Option<u8>) -> IsCa {
    match path_len {
        Some(len) => IsCa::Ca(BasicConstraints::Constrained(len)),
        None => IsCa::Ca(BasicConstraints::Unconstrained),
    }
}

/// Self-signed root valid over the given years
pub fn root_valid(common_name: &str, path_len: Option<u8>, from: i32, until: i32) -> Issued {
    let key = KeyPair::generate().unwrap();
    let mut params = params(common_name, from, until);
    params.is_ca = ca_constraint(path_len);
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

/// Self-signed root valid 2020-2040
pub fn root(common_name: &str, path_len: Option<u8>) -> Issued {
    root_valid(common_name, path_len, 2020, 2040)
}

/// CA certificate issued by `parent`, valid 2020-2040
pub fn intermediate(common_name: &str, parent: &Issued, path_len: Option<u8>) -> Issued {
    let key = KeyPair::generate().unwrap();
    let mut params = params(common_name, 2020, 2040);
    params.is_ca = ca_constraint(path_len);
    let cert = params.signed_by(&key, &parent.cert, &parent.key).unwrap();
    Issued { cert, key }
}

/// One CA name and key certified by each of `parents`, in order
pub fn cross_signed(common_name: &str, parents: &[&Issued]) -> Vec<Issued> {
    let key = KeyPair::generate().unwrap();
    parents
        .iter()
        .map(|parent| {
            let mut params = params(common_name, 2020, 2040);
            params.is_ca = ca_constraint(None);
            let cert = params.signed_by(&key, &parent.cert, &parent.key).unwrap();
            let key = KeyPair::from_pem(&key.serialize_pem()).unwrap();
            Issued { cert, key }
        })
        .collect()
}

/// Server certificate for `dns_name` issued by `parent`
pub fn leaf_valid(dns_name: &str, parent: &Issued, from: i32, until: i32) -> Issued {
    let key = KeyPair::generate().unwrap();
    let mut params = params(dns_name, from, until);
    params.subject_alt_names = CertificateParams::new(vec![dns_name.to_string()])
        .unwrap()
        .subject_alt_names;
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let cert = params.signed_by(&key, &parent.cert, &parent.key).unwrap();
    Issued { cert, key }
}

/// Server certificate for `dns_name` issued by `parent`, valid 2020-2040
pub fn leaf(dns_name: &str, parent: &Issued) -> Issued {
    leaf_valid(dns_name, parent, 2020, 2040)
}

/// Store trusting exactly `anchors`
pub fn store_with(anchors: &[&Issued]) -> TrustAnchorStore {
    let mut store = TrustAnchorStore::new();
    for anchor in anchors {
        store.add_pem(anchor.pem().as_bytes()).unwrap();
    }
    store
}

/// Serve `chain` over TLS on a loopback port, completing handshakes until
/// the test runtime shuts down. Returns the port.
pub async fn spawn_tls_server(chain: &[&Issued], key: &KeyPair) -> u16 {
    use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
    use std::sync::Arc;

    let certs: Vec<CertificateDer<'static>> = chain.iter().map(|c| c.der()).collect();
    let private_key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(certs, private_key)
    .unwrap();
    let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Failed handshakes are expected when the client rejects us
                let _ = acceptor.accept(stream).await;
            });
        }
    });

    port
}
