//! Server certificate chain retrieval
//!
//! Connects to a target, completes a TLS handshake verified against the
//! session's trust anchors, and returns the certificates the server
//! presented. When asked to, a failed handshake is retried once with
//! verification disabled so the chain can still be inspected; such chains
//! are always flagged.

use crate::models::{CertificateChain, RetrievedChain, Target};
use crate::trust::TrustAnchorStore;
use crate::utils::ConnectError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Certificate verifier that accepts everything.
///
/// Only used for the flagged insecure retry.
#[derive(Debug)]
struct AcceptAnyCertVerifier {
    schemes: Vec<SignatureScheme>,
}

impl ServerCertVerifier for AcceptAnyCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.schemes.clone()
    }
}

/// Retrieves presented certificate chains over TLS
pub struct ChainRetriever {
    connect_timeout: Duration,
    handshake_timeout: Duration,
    provider: Arc<CryptoProvider>,
}

impl ChainRetriever {
    pub fn new(connect_timeout: Duration, handshake_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            handshake_timeout,
            provider: Arc::new(rustls::crypto::ring::default_provider()),
        }
    }

    /// Fetch the chain `target` presents.
    ///
    /// The handshake is verified against `store`. With
    /// `allow_insecure_fallback`, a handshake failure (and only that) is
    /// retried without verification and the result carries the original
    /// error as its `insecure_reason`.
    pub async fn fetch(
        &self,
        target: &Target,
        store: &TrustAnchorStore,
        allow_insecure_fallback: bool,
    ) -> Result<RetrievedChain, ConnectError> {
        let verified = self.verified_config(store)?;

        match self.fetch_with_config(target, verified).await {
            Ok(chain) => Ok(RetrievedChain {
                target: target.clone(),
                chain,
                insecure_reason: None,
            }),
            Err(e) if allow_insecure_fallback && e.is_handshake_failure() => {
                tracing::warn!(
                    "Verified handshake with {} failed ({}); retrying without verification",
                    target,
                    e
                );
                let chain = self
                    .fetch_with_config(target, self.insecure_config()?)
                    .await?;
                Ok(RetrievedChain {
                    target: target.clone(),
                    chain,
                    insecure_reason: Some(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn verified_config(&self, store: &TrustAnchorStore) -> Result<ClientConfig, ConnectError> {
        Ok(ClientConfig::builder_with_provider(Arc::clone(&self.provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| ConnectError::Configuration {
                message: e.to_string(),
            })?
            .with_root_certificates(store.root_cert_store())
            .with_no_client_auth())
    }

    fn insecure_config(&self) -> Result<ClientConfig, ConnectError> {
        let verifier = AcceptAnyCertVerifier {
            schemes: self
                .provider
                .signature_verification_algorithms
                .supported_schemes(),
        };

        Ok(ClientConfig::builder_with_provider(Arc::clone(&self.provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| ConnectError::Configuration {
                message: e.to_string(),
            })?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth())
    }

    async fn fetch_with_config(
        &self,
        target: &Target,
        config: ClientConfig,
    ) -> Result<CertificateChain, ConnectError> {
        let server_name = ServerName::try_from(target.host.clone()).map_err(|_| {
            ConnectError::InvalidTarget {
                target: target.to_string(),
            }
        })?;

        let stream = self.connect(target).await?;
        let connector = TlsConnector::from(Arc::new(config));

        let tls_stream = tokio::time::timeout(
            self.handshake_timeout,
            connector.connect(server_name, stream),
        )
        .await
        .map_err(|_| ConnectError::Timeout {
            host: target.host.clone(),
            stage: "TLS handshake",
        })?
        .map_err(|e| ConnectError::Handshake {
            host: target.host.clone(),
            message: e.to_string(),
        })?;

        let (_, connection) = tls_stream.get_ref();
        let certificates = connection
            .peer_certificates()
            .map(|certs| certs.to_vec())
            .unwrap_or_default();

        if certificates.is_empty() {
            return Err(ConnectError::NoCertificates {
                host: target.host.clone(),
            });
        }

        tracing::debug!(
            "{} presented {} certificates",
            target,
            certificates.len()
        );
        Ok(CertificateChain::new(certificates))
    }

    /// Resolve the target and connect to the first address that accepts.
    /// Resolution and each connection attempt get the connect timeout.
    async fn connect(&self, target: &Target) -> Result<TcpStream, ConnectError> {
        let lookup = tokio::net::lookup_host((target.host.as_str(), target.port));
        let addrs: Vec<SocketAddr> = tokio::time::timeout(self.connect_timeout, lookup)
            .await
            .map_err(|_| ConnectError::Timeout {
                host: target.host.clone(),
                stage: "DNS resolution",
            })?
            .map_err(|e| ConnectError::Resolve {
                host: target.host.clone(),
                message: e.to_string(),
            })?
            .collect();

        let mut last_error = ConnectError::Resolve {
            host: target.host.clone(),
            message: "no addresses found".to_string(),
        };

        for addr in addrs {
            tracing::debug!("Connecting to {} ({})", target, addr);
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => return Ok(stream),
                Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                    last_error = ConnectError::Refused { addr };
                }
                Ok(Err(e)) => {
                    last_error = ConnectError::Tcp {
                        addr,
                        message: e.to_string(),
                    };
                }
                Err(_) => {
                    last_error = ConnectError::Timeout {
                        host: target.host.clone(),
                        stage: "TCP connect",
                    };
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_distinguishable() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let retriever = ChainRetriever::new(Duration::from_secs(2), Duration::from_secs(2));
        let store = TrustAnchorStore::with_bootstrap().unwrap();
        let err = retriever
            .fetch(&Target::new("127.0.0.1", port), &store, true)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectError::Refused { .. }));
        assert!(!err.is_handshake_failure());
    }

    #[tokio::test]
    async fn test_name_resolution_has_a_deadline() {
        // A name lookup is handed to the blocking pool and is still pending
        // on the first poll, when a zero deadline has already passed
        let retriever = ChainRetriever::new(Duration::ZERO, Duration::from_secs(2));
        let store = TrustAnchorStore::with_bootstrap().unwrap();
        let err = retriever
            .fetch(&Target::new("localhost", 443), &store, true)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConnectError::Timeout {
                stage: "DNS resolution",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let retriever = ChainRetriever::new(Duration::from_secs(2), Duration::from_secs(2));
        let store = TrustAnchorStore::with_bootstrap().unwrap();
        let err = retriever
            .fetch(&Target::new("nonexistent.invalid", 443), &store, false)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectError::Resolve { .. }));
    }
}
