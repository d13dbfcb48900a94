//! Application settings configuration
//!
//! Defines network timeouts, trust sources, and which checks run.

use crate::trust::{AnchorSource, DEFAULT_FEED_URL};
use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Network timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
    #[serde(default = "default_ocsp_timeout")]
    pub ocsp_timeout_secs: u64,
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_ocsp_timeout() -> u64 {
    5
}

fn default_feed_timeout() -> u64 {
    30
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            handshake_timeout_secs: default_handshake_timeout(),
            ocsp_timeout_secs: default_ocsp_timeout(),
            feed_timeout_secs: default_feed_timeout(),
        }
    }
}

impl NetworkSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn ocsp_timeout(&self) -> Duration {
        Duration::from_secs(self.ocsp_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

/// Where trust anchors come from
#[derive(Debug, Clone, Deserialize)]
pub struct TrustSettings {
    #[serde(default = "default_use_feed")]
    pub use_feed: bool,
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// Authenticate the feed download against the bootstrap anchor only.
    /// When off, the HTTP client's built-in roots are trusted instead.
    #[serde(default = "default_authenticate_feed")]
    pub authenticate_feed_with_bootstrap: bool,
    /// Local CA bundle; replaces the bootstrap anchor and the feed
    #[serde(default)]
    pub ca_file: Option<PathBuf>,
    /// Permit the unverified retry after a failed handshake
    #[serde(default)]
    pub allow_insecure_fallback: bool,
}

fn default_use_feed() -> bool {
    true
}

fn default_authenticate_feed() -> bool {
    true
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

impl Default for TrustSettings {
    fn default() -> Self {
        Self {
            use_feed: true,
            feed_url: default_feed_url(),
            authenticate_feed_with_bootstrap: default_authenticate_feed(),
            ca_file: None,
            allow_insecure_fallback: false,
        }
    }
}

impl TrustSettings {
    /// The seed sources these settings select, in load order
    pub fn anchor_sources(&self) -> Vec<AnchorSource> {
        if let Some(path) = &self.ca_file {
            return vec![AnchorSource::File(path.clone())];
        }

        let mut sources = vec![AnchorSource::Bootstrap];
        if self.use_feed {
            sources.push(AnchorSource::Feed {
                url: self.feed_url.clone(),
                authenticate_with_store: self.authenticate_feed_with_bootstrap,
            });
        }
        sources
    }
}

/// Which checks run and how many hosts at once
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSettings {
    #[serde(default = "default_check_revocation")]
    pub check_revocation: bool,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_check_revocation() -> bool {
    true
}

fn default_parallelism() -> usize {
    8
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            check_revocation: true,
            parallelism: 8,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub trust: TrustSettings,
    #[serde(default)]
    pub checks: CheckSettings,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [network]
            connect_timeout_secs = 3
            handshake_timeout_secs = 4

            [trust]
            use_feed = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.network.connect_timeout(), Duration::from_secs(3));
        assert_eq!(settings.network.ocsp_timeout(), Duration::from_secs(5));
        assert!(settings.checks.check_revocation);
        assert_eq!(settings.trust.anchor_sources(), vec![AnchorSource::Bootstrap]);
    }

    #[test]
    fn test_ca_file_replaces_other_sources() {
        let trust = TrustSettings {
            ca_file: Some(PathBuf::from("/tmp/ca.pem")),
            ..TrustSettings::default()
        };
        assert_eq!(
            trust.anchor_sources(),
            vec![AnchorSource::File(PathBuf::from("/tmp/ca.pem"))]
        );
    }

    #[test]
    fn test_default_sources_are_bootstrap_then_feed() {
        let sources = TrustSettings::default().anchor_sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], AnchorSource::Bootstrap);
        assert!(matches!(
            sources[1],
            AnchorSource::Feed {
                authenticate_with_store: true,
                ..
            }
        ));
    }

    #[test]
    fn test_feed_is_authenticated_by_bootstrap_unless_disabled() {
        let settings: Settings = toml::from_str("[trust]\nuse_feed = true\n").unwrap();
        assert!(settings.trust.authenticate_feed_with_bootstrap);

        let settings: Settings =
            toml::from_str("[trust]\nauthenticate_feed_with_bootstrap = false\n").unwrap();
        assert!(matches!(
            settings.trust.anchor_sources()[1],
            AnchorSource::Feed {
                authenticate_with_store: false,
                ..
            }
        ));
    }

    #[test]
    fn test_network_table_may_set_a_single_timeout() {
        let settings: Settings = toml::from_str("[network]\nocsp_timeout_secs = 2\n").unwrap();
        assert_eq!(settings.network.ocsp_timeout(), Duration::from_secs(2));
        assert_eq!(settings.network.connect_timeout(), Duration::from_secs(10));
        assert_eq!(settings.network.handshake_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Settings::load_from_file("/nonexistent/trustcheck.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
