//! Data models for tls-trustcheck
//!
//! This module contains all the data structures used throughout the application.

pub mod certificate;
pub mod chain;
pub mod report;

pub use certificate::{
    crl_reason_name, CertificateDetails, RevocationVerdict, UntrustedReason, ValidationVerdict,
};
pub use chain::{CertificateChain, RetrievedChain, Target, DEFAULT_PORT};
pub use report::{CertificateReport, HostReport, UnparsedCertificate};
