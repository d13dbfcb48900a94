//! Trust anchor store
//!
//! Holds the root certificates a validation session trusts. Anchors are only
//! ever added: the store is assembled first, then shared read-only (behind an
//! `Arc`) by the retriever, validator and revocation checker.

use crate::checks::certificate::CertificateChecker;
use crate::models::CertificateDetails;
use crate::trust::bootstrap::BOOTSTRAP_ROOT_PEM;
use crate::trust::feed::{parse_feed, FeedFetcher};
use crate::utils::StoreError;
use rustls::pki_types::{self, CertificateDer};
use rustls::RootCertStore;
use std::path::{Path, PathBuf};
use std::time::Duration;
use x509_parser::prelude::*;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// A certificate admitted as a root of trust
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    der: CertificateDer<'static>,
    details: CertificateDetails,
    subject_raw: Vec<u8>,
    anchor: pki_types::TrustAnchor<'static>,
}

impl TrustAnchor {
    /// Parse a DER certificate into an anchor
    pub fn from_der(der: CertificateDer<'static>) -> Result<Self, String> {
        let details = CertificateChecker::new()
            .parse_certificate(der.as_ref())
            .map_err(|e| e.to_string())?;

        let subject_raw = X509Certificate::from_der(der.as_ref())
            .map(|(_, cert)| cert.subject().as_raw().to_vec())
            .map_err(|e| format!("{:?}", e))?;

        let anchor = webpki::anchor_from_trusted_cert(&der)
            .map_err(|e| format!("not usable as a trust anchor: {:?}", e))?
            .to_owned();

        Ok(Self {
            der,
            details,
            subject_raw,
            anchor,
        })
    }

    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn details(&self) -> &CertificateDetails {
        &self.details
    }

    /// DER encoding of the subject Name, tag included
    pub fn subject_raw(&self) -> &[u8] {
        &self.subject_raw
    }

    /// The anchor in the form path building consumes
    pub fn trust_anchor(&self) -> &pki_types::TrustAnchor<'static> {
        &self.anchor
    }
}

/// Where anchors are seeded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorSource {
    /// The embedded bootstrap root
    Bootstrap,
    /// A CSV root program feed fetched over HTTPS
    Feed {
        url: String,
        /// Authenticate the feed download with the anchors assembled so far
        /// instead of the HTTP client's built-in roots
        authenticate_with_store: bool,
    },
    /// A local PEM bundle
    File(PathBuf),
}

/// Outcome of loading a trust feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub added: usize,
    pub skipped_rows: usize,
}

/// A mutable set of trust anchors for one validation session
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorStore {
    anchors: Vec<TrustAnchor>,
}

impl TrustAnchorStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the embedded bootstrap root
    pub fn with_bootstrap() -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.add_pem_named(BOOTSTRAP_ROOT_PEM.as_bytes(), "embedded bootstrap anchor")?;
        Ok(store)
    }

    /// Assemble a store from an explicit list of seed sources, in order.
    ///
    /// A feed that cannot be retrieved is logged and skipped so the other
    /// sources still apply; bootstrap and file failures are returned.
    pub async fn from_sources(
        sources: &[AnchorSource],
        feed_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();

        for source in sources {
            match source {
                AnchorSource::Bootstrap => {
                    store.add_pem_named(BOOTSTRAP_ROOT_PEM.as_bytes(), "embedded bootstrap anchor")?;
                }
                AnchorSource::File(path) => {
                    store.add_pem_file(path).await?;
                }
                AnchorSource::Feed {
                    url,
                    authenticate_with_store,
                } => {
                    let fetcher = if *authenticate_with_store {
                        FeedFetcher::with_anchors(feed_timeout, &store)
                    } else {
                        FeedFetcher::new(feed_timeout)
                    };
                    store.add_feed_or_warn(fetcher, url).await;
                }
            }
        }

        tracing::debug!("Trust store assembled with {} anchors", store.len());
        Ok(store)
    }

    async fn add_feed_or_warn(&mut self, fetcher: Result<FeedFetcher, StoreError>, url: &str) {
        let result = match fetcher {
            Ok(fetcher) => self.add_from_feed(&fetcher, url).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!("Continuing without trust feed: {}", e);
        }
    }

    /// Add every certificate block found in `pem`.
    ///
    /// Blocks that fail to decode or parse are skipped. Fails only when not
    /// a single certificate could be added.
    pub fn add_pem(&mut self, pem: &[u8]) -> Result<usize, StoreError> {
        self.add_pem_named(pem, "PEM input")
    }

    fn add_pem_named(&mut self, pem: &[u8], source_name: &str) -> Result<usize, StoreError> {
        let text = String::from_utf8_lossy(pem);
        let mut added = 0;

        for block in pem_blocks(&text) {
            let der = match ::pem::parse(block) {
                Ok(parsed) if parsed.tag() == "CERTIFICATE" => parsed.into_contents(),
                Ok(parsed) => {
                    tracing::debug!("Skipping PEM block with tag {}", parsed.tag());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping undecodable PEM block in {}: {}", source_name, e);
                    continue;
                }
            };

            match TrustAnchor::from_der(CertificateDer::from(der)) {
                Ok(anchor) => {
                    tracing::debug!("Added trust anchor {}", anchor.details().display_name());
                    self.anchors.push(anchor);
                    added += 1;
                }
                Err(message) => {
                    tracing::warn!("Skipping certificate in {}: {}", source_name, message);
                }
            }
        }

        if added == 0 {
            return Err(StoreError::Parse {
                source_name: source_name.to_string(),
            });
        }
        Ok(added)
    }

    /// Add the certificates of a local PEM bundle
    pub async fn add_pem_file(&mut self, path: &Path) -> Result<usize, StoreError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::FileRead {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        self.add_pem_named(&data, &path.display().to_string())
    }

    /// Download a root program feed and add each row's certificate.
    ///
    /// Malformed rows are logged and skipped; only a failed download is an
    /// error.
    pub async fn add_from_feed(
        &mut self,
        fetcher: &FeedFetcher,
        url: &str,
    ) -> Result<FeedSummary, StoreError> {
        let body = fetcher.fetch(url).await?;
        let rows = parse_feed(&body);

        let mut summary = FeedSummary {
            added: 0,
            skipped_rows: rows.skipped,
        };
        for (row, pem) in rows.certificates {
            match self.add_pem_named(pem.as_bytes(), &format!("feed row {}", row)) {
                Ok(count) => summary.added += count,
                Err(_) => summary.skipped_rows += 1,
            }
        }

        tracing::info!(
            "Loaded {} anchors from trust feed ({} rows skipped)",
            summary.added,
            summary.skipped_rows
        );
        Ok(summary)
    }

    /// Read-only view of the current anchors
    pub fn anchors(&self) -> &[TrustAnchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Find an anchor whose subject is the issuer of `cert`
    pub fn find_issuer(&self, cert: &[u8]) -> Option<&TrustAnchor> {
        let (_, parsed) = X509Certificate::from_der(cert).ok()?;
        let issuer = parsed.issuer().as_raw();
        self.anchors.iter().find(|a| a.subject_raw() == issuer)
    }

    /// Root pool for the TLS client
    pub fn root_cert_store(&self) -> RootCertStore {
        RootCertStore::from_iter(self.anchors.iter().map(|a| a.trust_anchor().clone()))
    }
}

/// Split text into `BEGIN CERTIFICATE`..`END CERTIFICATE` spans.
///
/// A BEGIN marker without a matching END ends the scan.
fn pem_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(PEM_BEGIN) {
        let after_begin = &rest[start..];
        match after_begin.find(PEM_END) {
            Some(end) => {
                let block_end = end + PEM_END.len();
                blocks.push(&after_begin[..block_end]);
                rest = &after_begin[block_end..];
            }
            None => break,
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::bootstrap::BOOTSTRAP_ROOT_NAME;

    #[test]
    fn test_bootstrap_store_has_one_anchor() {
        let store = TrustAnchorStore::with_bootstrap().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.anchors()[0].details().subject_cn.as_deref(),
            Some(BOOTSTRAP_ROOT_NAME)
        );
    }

    #[test]
    fn test_bootstrap_anchor_is_its_own_issuer() {
        let store = TrustAnchorStore::with_bootstrap().unwrap();
        let root = store.anchors()[0].der().as_ref().to_vec();
        assert!(store.find_issuer(&root).is_some());
    }

    #[tokio::test]
    async fn test_unbuildable_feed_client_keeps_existing_anchors() {
        let mut store = TrustAnchorStore::with_bootstrap().unwrap();
        let fetcher = Err(StoreError::Fetch {
            url: String::new(),
            message: "client build failed".to_string(),
        });

        store.add_feed_or_warn(fetcher, "https://feed.invalid/roots.csv").await;
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_pem_rejects_input_without_certificates() {
        let mut store = TrustAnchorStore::new();
        let err = store.add_pem(b"not a certificate").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_pem_skips_corrupt_block() {
        let mut input = String::from("-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n");
        input.push_str(BOOTSTRAP_ROOT_PEM);

        let mut store = TrustAnchorStore::new();
        assert_eq!(store.add_pem(input.as_bytes()).unwrap(), 1);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut store = TrustAnchorStore::new();
        store.add_pem(BOOTSTRAP_ROOT_PEM.as_bytes()).unwrap();
        store.add_pem(BOOTSTRAP_ROOT_PEM.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.root_cert_store().len(), 2);
    }

    #[test]
    fn test_pem_blocks_stops_at_unterminated_block() {
        let text = format!("{}\nAAAA\n{}\n{}\nBBBB", PEM_BEGIN, PEM_END, PEM_BEGIN);
        assert_eq!(pem_blocks(&text).len(), 1);
    }
}
