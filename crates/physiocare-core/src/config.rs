//! Client configuration.

use serde::{Deserialize, Serialize};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://matiasborra.es/api/physio/";

/// Settings for building the HTTP gateway.
///
/// Timeouts left unset use the transport defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint path is resolved against
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at a different backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Base URL with exactly one trailing slash, so relative paths join
    /// under it instead of replacing its last segment.
    pub fn normalized_base_url(&self) -> String {
        format!("{}/", self.base_url.trim().trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ClientConfig::from_json(r#"{"timeout_secs": 15}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, Some(15));

        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_normalized_base_url() {
        assert_eq!(
            ClientConfig::with_base_url("http://localhost:8080/api").normalized_base_url(),
            "http://localhost:8080/api/"
        );
        assert_eq!(
            ClientConfig::with_base_url("http://localhost:8080/api//").normalized_base_url(),
            "http://localhost:8080/api/"
        );
    }
}
