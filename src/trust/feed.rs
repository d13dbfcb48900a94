//! Root program trust feed
//!
//! The feed is a CSV document whose first column holds a quoted PEM
//! certificate. Quoting in the wild is sloppy, so rows are read leniently and
//! any row that does not yield a certificate is skipped rather than aborting
//! the feed.

use crate::trust::store::TrustAnchorStore;
use crate::utils::StoreError;
use std::time::Duration;

/// Default public root program feed (websites trust bit)
pub const DEFAULT_FEED_URL: &str =
    "https://ccadb.my.salesforce-sites.com/mozilla/IncludedRootsDistrustTLSSSLPEMCSV?TrustBitsInclude=Websites";

/// Certificate cells extracted from a feed
#[derive(Debug, Default)]
pub struct FeedRows {
    /// (row number, PEM text) for every row that looked like a certificate
    pub certificates: Vec<(usize, String)>,
    /// Rows that could not be read or held no certificate
    pub skipped: usize,
}

/// Downloads the trust feed with a bounded timeout
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    /// Fetcher trusting the HTTP client's built-in roots
    pub fn new(timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Fetch {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Fetcher trusting only the anchors currently in `store`
    pub fn with_anchors(timeout: Duration, store: &TrustAnchorStore) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .tls_built_in_root_certs(false);

        for anchor in store.anchors() {
            let cert = reqwest::Certificate::from_der(anchor.der().as_ref()).map_err(|e| {
                StoreError::Fetch {
                    url: String::new(),
                    message: format!("unusable anchor for feed client: {}", e),
                }
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build().map_err(|e| StoreError::Fetch {
            url: String::new(),
            message: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// Download the feed body
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        let fetch_error = |message: String| StoreError::Fetch {
            url: url.to_string(),
            message,
        };

        tracing::debug!("Downloading trust feed from {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_error("request timed out".to_string())
            } else {
                fetch_error(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Read the feed rows, keeping the first column of each data row.
pub fn parse_feed(body: &[u8]) -> FeedRows {
    let mut rows = FeedRows::default();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    for (index, record) in reader.records().enumerate() {
        // Header is line 1
        let row = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping unreadable feed row {}: {}", row, e);
                rows.skipped += 1;
                continue;
            }
        };

        match record.get(0).and_then(unwrap_pem_cell) {
            Some(pem) => rows.certificates.push((row, pem.to_string())),
            None => {
                tracing::debug!("Feed row {} holds no certificate", row);
                rows.skipped += 1;
            }
        }
    }

    rows
}

/// Strip exactly one leading and one trailing quote from a certificate cell.
///
/// Returns `None` when the cell holds no PEM certificate marker.
pub fn unwrap_pem_cell(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    if !trimmed.contains("BEGIN CERTIFICATE") {
        return None;
    }

    let is_quote = |c: char| c == '\'' || c == '"';
    let mut inner = trimmed;
    if inner.starts_with(is_quote) {
        inner = &inner[1..];
    }
    if inner.ends_with(is_quote) {
        inner = &inner[..inner.len() - 1];
    }
    Some(inner)
}
