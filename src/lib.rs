//! tls-trustcheck library
//!
//! A TLS trust-validation engine providing:
//! - Trust anchor assembly from an embedded root, a root program feed or PEM files
//! - Certificate chain retrieval with an explicit, flagged insecure fallback
//! - Validity window and chain-of-trust verification
//! - OCSP revocation checking
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tls_trustcheck::config::Settings;
//! use tls_trustcheck::models::Target;
//! use tls_trustcheck::runner::{build_trust_store, HostChecker};
//!
//! #[tokio::main]
//! async fn main() -> tls_trustcheck::Result<()> {
//!     let settings = Settings::default();
//!     let store = build_trust_store(&settings).await?;
//!     let checker = HostChecker::new(&settings, Arc::new(store))?;
//!     let report = checker
//!         .check_host(&Target::parse("https://example.com/")?, &|_| {})
//!         .await?;
//!     println!("{}", report.chain);
//!     Ok(())
//! }
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod runner;
pub mod trust;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use checks::{ChainRetriever, ChainValidator, OcspChecker};
pub use cli::Cli;
pub use config::Settings;
pub use models::{HostReport, RevocationVerdict, Target, ValidationVerdict};
pub use trust::{AnchorSource, TrustAnchorStore};
pub use utils::{Result, TrustCheckError};
