//! Configuration module for tls-trustcheck
//!
//! Handles loading settings from TOML files.

pub mod settings;

pub use settings::{CheckSettings, NetworkSettings, Settings, TrustSettings};
