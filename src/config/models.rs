//! Configuration data structures for formpost.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files. Every
//! field has a default so an empty file, or no file at all, yields a working client.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Contact endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str =
    "https://vj5g5k1f4b.execute-api.us-east-1.amazonaws.com/dev/contact";

/// Backoff between attempts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first failed attempt (in milliseconds); doubles each retry
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay (in milliseconds)
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
        }
    }
}

/// Health probe settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute URL the form is posted to
    pub endpoint: String,
    /// Per-attempt deadline in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt (total attempts = retries + 1)
    pub retries: u32,
    /// Sent as the `User-Agent` header
    pub user_agent: String,
    pub backoff: BackoffConfig,
    pub health_check: HealthCheckConfig,
}

impl ClientConfig {
    /// Create a new client configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check.timeout_secs)
    }

    /// Health URL: the endpoint with its first `/contact` replaced by `/health`.
    pub fn health_endpoint(&self) -> String {
        self.endpoint.replacen("/contact", "/health", 1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            retries: 2,
            user_agent: concat!("formpost/", env!("CARGO_PKG_VERSION")).to_string(),
            backoff: BackoffConfig::default(),
            health_check: HealthCheckConfig::default(),
        }
    }
}

/// Builder for ClientConfig to allow for cleaner configuration creation
#[derive(Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    retries: Option<u32>,
    user_agent: Option<String>,
    backoff: Option<BackoffConfig>,
    health_check: Option<HealthCheckConfig>,
}

impl ClientConfigBuilder {
    /// Set the contact endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the default retry count
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the backoff delays (milliseconds)
    pub fn backoff(mut self, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.backoff = Some(BackoffConfig {
            initial_delay_ms,
            max_delay_ms,
        });
        self
    }

    /// Set the health probe timeout
    pub fn health_timeout_secs(mut self, secs: u64) -> Self {
        self.health_check = Some(HealthCheckConfig { timeout_secs: secs });
        self
    }

    /// Build the final ClientConfig
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            retries: self.retries.unwrap_or(defaults.retries),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            backoff: self.backoff.unwrap_or(defaults.backoff),
            health_check: self.health_check.unwrap_or(defaults.health_check),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retries, 2);
        assert_eq!(config.backoff.initial_delay_ms, 1000);
        assert_eq!(config.backoff.max_delay_ms, 5000);
        assert_eq!(config.health_timeout(), Duration::from_secs(5));
        assert!(config.user_agent.starts_with("formpost/"));
    }

    #[test]
    fn test_health_endpoint_replaces_contact_segment() {
        let config = ClientConfig::default();
        assert_eq!(
            config.health_endpoint(),
            "https://vj5g5k1f4b.execute-api.us-east-1.amazonaws.com/dev/health"
        );

        let local = ClientConfig::builder()
            .endpoint("http://127.0.0.1:9000/api/contact")
            .build();
        assert_eq!(local.health_endpoint(), "http://127.0.0.1:9000/api/health");
    }

    #[test]
    fn test_builder_overrides_only_given_fields() {
        let config = ClientConfig::builder()
            .retries(5)
            .backoff(100, 800)
            .build();

        assert_eq!(config.retries, 5);
        assert_eq!(config.backoff.initial_delay_ms, 100);
        assert_eq!(config.backoff.max_delay_ms, 800);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"retries": 0}"#).unwrap();
        assert_eq!(config.retries, 0);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.health_check.timeout_secs, 5);
    }
}
