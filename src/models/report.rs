//! Per-host check report

use crate::models::{CertificateDetails, RevocationVerdict, Target, ValidationVerdict};
use serde::Serialize;

/// One certificate of the presented chain with its validity verdict
#[derive(Debug, Clone, Serialize)]
pub struct CertificateReport {
    pub details: CertificateDetails,
    pub validity: ValidationVerdict,
}

/// A presented certificate that could not be parsed
#[derive(Debug, Clone, Serialize)]
pub struct UnparsedCertificate {
    /// Index in the presented chain, leaf at 0
    pub position: usize,
    pub error: String,
}

/// Everything learned about one host in a single validation session
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub target: Target,
    /// Whether the chain was only obtained with verification disabled
    pub retrieved_insecurely: bool,
    /// Certificates as presented, leaf first
    pub certificates: Vec<CertificateReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unparsed: Vec<UnparsedCertificate>,
    /// Chain-of-trust verdict
    pub chain: ValidationVerdict,
    /// Leaf revocation verdict; `None` when revocation checking was skipped
    pub revocation: Option<RevocationVerdict>,
}

impl HostReport {
    /// Whether every check that ran passed
    pub fn is_healthy(&self) -> bool {
        !self.retrieved_insecurely
            && self.unparsed.is_empty()
            && self.chain.is_ok()
            && self.certificates.iter().all(|c| c.validity.is_ok())
            && !matches!(
                self.revocation,
                Some(RevocationVerdict::Revoked { .. }) | Some(RevocationVerdict::Unknown)
            )
    }
}
