//! Check targets and retrieved certificate chains

use crate::utils::ConnectError;
use reqwest::Url;
use rustls::pki_types::CertificateDer;
use serde::Serialize;
use std::fmt;

/// Default HTTPS port
pub const DEFAULT_PORT: u16 = 443;

/// A host to check, normalised from a URL or `host[:port]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `https://host[:port]/path`, `host:port` or a bare host.
    ///
    /// Scheme, path, query and trailing slash are dropped and the host is
    /// lowercased. Only the `https` scheme is accepted.
    pub fn parse(input: &str) -> Result<Self, ConnectError> {
        let trimmed = input.trim();
        let invalid = || ConnectError::InvalidTarget {
            target: input.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid());
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
        if url.scheme() != "https" {
            return Err(invalid());
        }

        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(invalid)?;

        Ok(Self {
            host: host.to_lowercase(),
            port: url.port().unwrap_or(DEFAULT_PORT),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "{}", self.host)
        } else if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Certificates as presented by a server, leaf first
#[derive(Debug, Clone, Default)]
pub struct CertificateChain {
    certificates: Vec<CertificateDer<'static>>,
}

impl CertificateChain {
    pub fn new(certificates: Vec<CertificateDer<'static>>) -> Self {
        Self { certificates }
    }

    /// Build a chain from raw DER blobs
    pub fn from_der(certificates: Vec<Vec<u8>>) -> Self {
        Self::new(certificates.into_iter().map(CertificateDer::from).collect())
    }

    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.certificates.first()
    }

    /// Everything the server sent after the leaf
    pub fn intermediates(&self) -> &[CertificateDer<'static>] {
        self.certificates.get(1..).unwrap_or(&[])
    }

    /// The certificate the server presented directly after the leaf
    pub fn leaf_issuer(&self) -> Option<&CertificateDer<'static>> {
        self.certificates.get(1)
    }

    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certificates
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// A chain returned by the retriever together with how it was obtained
#[derive(Debug, Clone)]
pub struct RetrievedChain {
    pub target: Target,
    pub chain: CertificateChain,
    /// Set when the chain was only obtained after verification was disabled;
    /// holds the error of the verified attempt.
    pub insecure_reason: Option<String>,
}

impl RetrievedChain {
    pub fn retrieved_insecurely(&self) -> bool {
        self.insecure_reason.is_some()
    }
}
