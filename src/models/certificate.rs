//! Certificate information and verdict types

use crate::checks::certificate::CertificateChecker;
use crate::utils::CertificateError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Fields of an X.509 certificate needed for validation and reporting
#[derive(Debug, Clone, Serialize)]
pub struct CertificateDetails {
    /// Full subject distinguished name
    pub subject: String,
    /// Subject common name, if present
    pub subject_cn: Option<String>,
    /// Full issuer distinguished name
    pub issuer: String,
    /// Issuer common name, if present
    pub issuer_cn: Option<String>,
    /// Serial number (colon separated hex)
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// DNS names from the Subject Alternative Name extension
    pub dns_names: Vec<String>,
    /// IP addresses from the Subject Alternative Name extension
    pub ip_addresses: Vec<String>,
    /// Public key algorithm
    pub public_key_algorithm: String,
    /// Public key size in bits (0 when unknown)
    pub public_key_size: u32,
    /// Whether basic constraints mark this certificate as a CA
    pub is_ca: bool,
    /// Basic constraints path length, if any
    pub path_len_constraint: Option<u32>,
    /// Whether subject and issuer are the same name
    pub is_self_signed: bool,
    /// OCSP responder URLs from the Authority Information Access extension
    pub ocsp_responders: Vec<String>,
    /// CRL distribution points (reported only, never fetched)
    pub crl_distribution_points: Vec<String>,
    /// SHA-256 fingerprint of the DER encoding
    pub fingerprint_sha256: String,
    /// Raw certificate in DER format
    #[serde(skip)]
    pub raw_der: Vec<u8>,
}

impl CertificateDetails {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        CertificateChecker::new().parse_certificate(der)
    }

    /// Days until expiry relative to `now` (negative if expired)
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.not_after.signed_duration_since(now).num_days()
    }

    /// A display name: the CN when present, the full subject otherwise
    pub fn display_name(&self) -> &str {
        self.subject_cn.as_deref().unwrap_or(&self.subject)
    }
}

/// Outcome of a validity or chain check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationVerdict {
    /// Reference time is inside the validity window
    Valid,
    /// Reference time is before notBefore
    NotYetValid,
    /// Reference time is after notAfter
    Expired,
    /// No acceptable path to a trust anchor
    ChainUntrusted(UntrustedReason),
    /// The chain builds to a trust anchor and matches the hostname
    ChainValid,
}

impl ValidationVerdict {
    /// Whether this verdict is a passing one
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationVerdict::Valid | ValidationVerdict::ChainValid)
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationVerdict::Valid => write!(f, "Valid"),
            ValidationVerdict::NotYetValid => write!(f, "Not yet valid"),
            ValidationVerdict::Expired => write!(f, "Expired"),
            ValidationVerdict::ChainUntrusted(reason) => write!(f, "Untrusted ({})", reason),
            ValidationVerdict::ChainValid => write!(f, "Trusted"),
        }
    }
}

/// Why a chain was not trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UntrustedReason {
    /// No path from the leaf to any anchor in the store
    NoPathFound,
    /// The leaf is not valid for the requested hostname
    HostnameMismatch { hostname: String },
    /// The only anchors that could terminate the path have expired
    ExpiredAnchor { anchor: String },
    /// A basic constraints path length was exceeded
    PathLengthExceeded,
    /// A certificate in the path is outside its validity window
    CertificateExpired,
    /// A certificate in the path is not yet valid
    CertificateNotYetValid,
    /// A CA certificate was presented as the leaf, or a leaf used as a CA
    InvalidBasicConstraints,
    /// A signature in the path did not verify
    BadSignature,
    /// The leaf could not be parsed
    Malformed { message: String },
    /// The chain was only obtained with verification disabled
    RetrievedWithoutVerification { handshake_error: String },
    /// Any other path-building failure
    Other { message: String },
}

impl fmt::Display for UntrustedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UntrustedReason::NoPathFound => write!(f, "no path to a trust anchor"),
            UntrustedReason::HostnameMismatch { hostname } => {
                write!(f, "certificate not valid for {}", hostname)
            }
            UntrustedReason::ExpiredAnchor { anchor } => {
                write!(f, "trust anchor {} has expired", anchor)
            }
            UntrustedReason::PathLengthExceeded => write!(f, "path length constraint exceeded"),
            UntrustedReason::CertificateExpired => write!(f, "certificate in path has expired"),
            UntrustedReason::CertificateNotYetValid => {
                write!(f, "certificate in path is not yet valid")
            }
            UntrustedReason::InvalidBasicConstraints => {
                write!(f, "basic constraints violated")
            }
            UntrustedReason::BadSignature => write!(f, "signature verification failed"),
            UntrustedReason::Malformed { message } => write!(f, "malformed certificate: {}", message),
            UntrustedReason::RetrievedWithoutVerification { handshake_error } => {
                write!(f, "retrieved without verification: {}", handshake_error)
            }
            UntrustedReason::Other { message } => write!(f, "{}", message),
        }
    }
}

/// Certificate revocation verdict from an OCSP check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RevocationVerdict {
    /// The responder vouches the certificate is not revoked
    Good,
    /// The certificate has been revoked
    Revoked {
        /// When the certificate was revoked
        revoked_at: DateTime<Utc>,
        /// CRL reason code, when the responder supplied one
        reason: Option<u8>,
    },
    /// The responder does not know the certificate
    Unknown,
    /// The check could not be completed; never to be read as `Good`
    CheckFailed { reason: String },
}

impl RevocationVerdict {
    /// Whether a definitive answer was obtained from the responder
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            RevocationVerdict::Good | RevocationVerdict::Revoked { .. }
        )
    }
}

impl fmt::Display for RevocationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevocationVerdict::Good => write!(f, "Not Revoked"),
            RevocationVerdict::Revoked { revoked_at, reason } => {
                write!(f, "Revoked at {}", revoked_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
                if let Some(code) = reason {
                    write!(f, " ({})", crl_reason_name(*code))?;
                }
                Ok(())
            }
            RevocationVerdict::Unknown => write!(f, "Unknown to responder"),
            RevocationVerdict::CheckFailed { reason } => write!(f, "Check failed ({})", reason),
        }
    }
}

/// Name of an RFC 5280 CRLReason code
pub fn crl_reason_name(code: u8) -> &'static str {
    match code {
        0 => "unspecified",
        1 => "keyCompromise",
        2 => "cACompromise",
        3 => "affiliationChanged",
        4 => "superseded",
        5 => "cessationOfOperation",
        6 => "certificateHold",
        8 => "removeFromCRL",
        9 => "privilegeWithdrawn",
        10 => "aACompromise",
        _ => "unrecognized",
    }
}
