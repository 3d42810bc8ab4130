use crate::error::{ExchangeError, Result};
use serde::Deserialize;

pub const DEFAULT_KRAKEN_REST_URL: &str = "https://api.kraken.com";

/// Connection settings for the Kraken adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KrakenConfig {
    /// API key; empty restricts the adapter to public endpoints
    pub api_key: String,

    /// Base64-encoded API secret
    pub api_secret: String,

    pub base_url: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// When set, order entry is a no-op that reports synthetic success
    pub is_simulated: bool,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: DEFAULT_KRAKEN_REST_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            is_simulated: true,
        }
    }
}

impl KrakenConfig {
    /// Reads `KRAKEN_*` variables, falling back to defaults for unset ones
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(key) = lookup("KRAKEN_API_KEY") {
            config.api_key = key;
        }
        if let Some(secret) = lookup("KRAKEN_API_SECRET") {
            config.api_secret = secret;
        }
        if let Some(url) = lookup("KRAKEN_REST_URL") {
            config.base_url = url;
        }
        if let Some(raw) = lookup("KRAKEN_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| ExchangeError::Config(format!("KRAKEN_TIMEOUT_SECS is not a number: {}", raw)))?;
        }
        if let Some(raw) = lookup("KRAKEN_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = raw.parse().map_err(|_| {
                ExchangeError::Config(format!("KRAKEN_CONNECT_TIMEOUT_SECS is not a number: {}", raw))
            })?;
        }
        if let Some(raw) = lookup("KRAKEN_SIMULATED") {
            config.is_simulated = parse_bool(&raw)
                .ok_or_else(|| ExchangeError::Config(format!("KRAKEN_SIMULATED is not a boolean: {}", raw)))?;
        }

        Ok(config)
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_simulated(mut self, is_simulated: bool) -> Self {
        self.is_simulated = is_simulated;
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_public_and_simulated() {
        let config = KrakenConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_KRAKEN_REST_URL);
        assert!(config.is_simulated);
        assert!(!config.has_credentials());
    }

    #[test]
    fn reads_overrides() {
        let config = KrakenConfig::from_lookup(lookup(&[
            ("KRAKEN_API_KEY", "key"),
            ("KRAKEN_API_SECRET", "c2VjcmV0"),
            ("KRAKEN_TIMEOUT_SECS", "5"),
            ("KRAKEN_CONNECT_TIMEOUT_SECS", "2"),
            ("KRAKEN_SIMULATED", "false"),
        ]))
        .unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 2);
        assert!(!config.is_simulated);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(KrakenConfig::from_lookup(lookup(&[("KRAKEN_TIMEOUT_SECS", "soon")])).is_err());
        assert!(KrakenConfig::from_lookup(lookup(&[("KRAKEN_CONNECT_TIMEOUT_SECS", "-1")])).is_err());
        assert!(KrakenConfig::from_lookup(lookup(&[("KRAKEN_SIMULATED", "maybe")])).is_err());
    }

    #[test]
    fn deserializes_partial_json() {
        let config: KrakenConfig = serde_json::from_str(r#"{"api_key":"k","is_simulated":false}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert!(!config.is_simulated);
        assert_eq!(config.timeout_secs, 30);
    }
}
