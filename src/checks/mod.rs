//! Check modules for tls-trustcheck
//!
//! Chain retrieval, validity and chain-of-trust verification, and OCSP
//! revocation checking, plus the certificate parsing they share.

pub mod certificate;
pub mod der;
pub mod ocsp;
pub mod retriever;
pub mod validator;

pub use certificate::CertificateChecker;
pub use ocsp::{build_request, parse_request, parse_response, CertId, HashAlgorithm, OcspChecker};
pub use retriever::ChainRetriever;
pub use validator::ChainValidator;
