//! Utility modules for tls-trustcheck
//!
//! This module contains error types and progress indicators.

pub mod error;
pub mod progress;

pub use error::{
    CertificateError, ConfigError, ConnectError, OcspError, Result, StoreError, TrustCheckError,
};
pub use progress::{create_progress_bar, create_spinner};
