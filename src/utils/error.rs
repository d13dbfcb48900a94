//! Custom error types for tls-trustcheck
//!
//! Each concern gets its own `thiserror` enum so callers can tell a feed
//! problem from a connection problem from an OCSP problem without string
//! matching. `TrustCheckError` aggregates them for the orchestration layer.

use std::net::SocketAddr;
use thiserror::Error;

/// Top-level error type for tls-trustcheck
#[derive(Error, Debug)]
pub enum TrustCheckError {
    #[error("Trust store error: {0}")]
    Store(#[from] StoreError),

    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("OCSP error: {0}")]
    Ocsp(#[from] OcspError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trust anchor store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No usable certificate block in the input
    #[error("No valid certificate blocks found in {source_name}")]
    Parse { source_name: String },

    /// The trust feed could not be retrieved at all
    #[error("Failed to fetch trust feed from {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to read CA bundle {path}: {message}")]
    FileRead { path: String, message: String },
}

/// Chain retrieval errors, one variant per distinguishable cause
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Invalid target: {target}")]
    InvalidTarget { target: String },

    #[error("Failed to resolve {host}: {message}")]
    Resolve { host: String, message: String },

    #[error("Connection refused by {addr}")]
    Refused { addr: SocketAddr },

    #[error("TCP connection to {addr} failed: {message}")]
    Tcp { addr: SocketAddr, message: String },

    #[error("{stage} timed out for {host}")]
    Timeout { host: String, stage: &'static str },

    #[error("TLS handshake with {host} failed: {message}")]
    Handshake { host: String, message: String },

    #[error("{host} presented no certificates")]
    NoCertificates { host: String },

    #[error("TLS configuration error: {message}")]
    Configuration { message: String },
}

impl ConnectError {
    /// Whether the failure happened during the TLS handshake itself,
    /// as opposed to name resolution or the TCP connect.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(self, ConnectError::Handshake { .. })
    }
}

/// Certificate parsing errors
#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Failed to parse certificate: {message}")]
    Parse { message: String },

    #[error("Certificate validity timestamp out of range")]
    InvalidTime,
}

/// OCSP revocation checking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcspError {
    #[error("Certificate has no OCSP responder")]
    NoResponder,

    #[error("Invalid OCSP responder URL {url}: {message}")]
    InvalidResponderUrl { url: String, message: String },

    #[error("Failed to build OCSP request: {message}")]
    RequestBuild { message: String },

    #[error("OCSP responder unreachable: {message}")]
    ResponderUnreachable { message: String },

    #[error("OCSP request timed out")]
    Timeout,

    #[error("OCSP responder error: {message}")]
    ResponderError { message: String },

    #[error("Failed to parse OCSP response: {message}")]
    ResponseParse { message: String },

    #[error("OCSP responder returned status {status}")]
    ResponseStatus { status: String },

    #[error("OCSP response does not cover the requested certificate")]
    CertificateMismatch,

    #[error("OCSP response signature invalid: {message}")]
    SignatureInvalid { message: String },

    #[error("OCSP response is stale (nextUpdate {next_update})")]
    Stale { next_update: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },
}

/// Result type alias using TrustCheckError
pub type Result<T> = std::result::Result<T, TrustCheckError>;
