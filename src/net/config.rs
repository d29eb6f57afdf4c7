//! Client configuration.
//!
//! Values come from, in order of precedence:
//! 1. Explicit `with_*` calls
//! 2. Environment variables (`CONVEX_PEER_URL`, `CONVEX_TIMEOUT_MS`, `CONVEX_KDF_ITERATIONS`)
//! 3. Built-in defaults
//!
//! A TOML document with the same fields is also accepted:
//!
//! ```toml
//! peer_url = "https://peer.convex.live"
//! timeout_ms = 5000
//! kdf_iterations = 200000
//! ```

use crate::crypto::password::{DEFAULT_ITERATIONS, MAX_ITERATIONS};
use crate::error::{Result, SdkError};
use serde::Deserialize;
use std::time::Duration;

/// Peer used when nothing else is configured.
pub const DEFAULT_PEER_URL: &str = "http://localhost:8080";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable names
mod env_vars {
    pub const PEER_URL: &str = "CONVEX_PEER_URL";
    pub const TIMEOUT_MS: &str = "CONVEX_TIMEOUT_MS";
    pub const KDF_ITERATIONS: &str = "CONVEX_KDF_ITERATIONS";
}

/// Settings shared by the client and the key store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the peer's REST API.
    pub peer_url: String,
    /// Upper bound on each network round trip.
    pub timeout: Duration,
    /// PBKDF2 iterations for newly stored keys.
    pub kdf_iterations: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            peer_url: DEFAULT_PEER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            kdf_iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    peer_url: Option<String>,
    timeout_ms: Option<u64>,
    kdf_iterations: Option<u32>,
}

impl ClientConfig {
    pub fn new(peer_url: impl Into<String>) -> Self {
        Self {
            peer_url: peer_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| SdkError::Config(format!("Invalid TOML: {}", e)))?;

        let defaults = Self::default();
        let config = Self {
            peer_url: file.peer_url.unwrap_or(defaults.peer_url),
            timeout: file
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            kdf_iterations: file.kdf_iterations.unwrap_or(defaults.kdf_iterations),
        };
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(env_vars::PEER_URL) {
            tracing::debug!("Using {} for peer URL", env_vars::PEER_URL);
            config.peer_url = url;
        }
        if let Some(raw) = lookup(env_vars::TIMEOUT_MS) {
            let ms = raw.parse::<u64>().map_err(|_| {
                SdkError::Config(format!("{} must be an integer, got '{}'", env_vars::TIMEOUT_MS, raw))
            })?;
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(env_vars::KDF_ITERATIONS) {
            config.kdf_iterations = raw.parse::<u32>().map_err(|_| {
                SdkError::Config(format!(
                    "{} must be an integer, got '{}'",
                    env_vars::KDF_ITERATIONS,
                    raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_peer_url(mut self, peer_url: impl Into<String>) -> Self {
        self.peer_url = peer_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.peer_url.starts_with("http://") || self.peer_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "Peer URL must be http(s), got '{}'",
                self.peer_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(SdkError::Config("Timeout must be positive".to_string()));
        }
        if self.kdf_iterations == 0 || self.kdf_iterations > MAX_ITERATIONS {
            return Err(SdkError::Config(format!(
                "Key derivation iterations must be between 1 and {}",
                MAX_ITERATIONS
            )));
        }
        Ok(())
    }
}
