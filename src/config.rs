//! Tap configuration
//!
//! The configuration document is JSON, supplied either as a file (`--config`)
//! or inline (`--config-json`). Per-resource settings live in the
//! `inquiries` / `cases` blocks; the flat `start_inquiry_id` and
//! `start_case_id` keys are still honoured for older configs.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default Persona API base URL
pub const DEFAULT_BASE_URL: &str = "https://withpersona.com/api/v1";

/// Default number of resources requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete tap configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Resources per page (`page[size]`)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Lower bound for `updated-at` filtering when no boundary is known
    #[serde(default)]
    pub start_date: Option<String>,

    /// Legacy flat start ID for inquiries
    #[serde(default)]
    pub start_inquiry_id: Option<String>,

    /// Legacy flat start ID for cases
    #[serde(default)]
    pub start_case_id: Option<String>,

    /// Inquiry-specific settings
    #[serde(default)]
    pub inquiries: ResourceConfig,

    /// Case-specific settings
    #[serde(default)]
    pub cases: ResourceConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("start_date", &self.start_date)
            .field("start_inquiry_id", &self.start_inquiry_id)
            .field("start_case_id", &self.start_case_id)
            .field("inquiries", &self.inquiries)
            .field("cases", &self.cases)
            .field("http", &self.http)
            .finish()
    }
}

impl TapConfig {
    /// Create a config with just an API key; everything else defaulted
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            page_size: DEFAULT_PAGE_SIZE,
            start_date: None,
            start_inquiry_id: None,
            start_case_id: None,
            inquiries: ResourceConfig::default(),
            cases: ResourceConfig::default(),
            http: HttpSettings::default(),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Parse and validate a config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json_str(&content)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }

        let base = url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }

        if let Some(start_date) = &self.start_date {
            chrono::DateTime::parse_from_rfc3339(start_date)
                .map_err(|e| Error::invalid_value("start_date", e.to_string()))?;
        }

        Ok(())
    }

    /// Settings block for a resource collection
    pub fn resource(&self, stream: &str) -> Option<&ResourceConfig> {
        match stream {
            "inquiries" => Some(&self.inquiries),
            "cases" => Some(&self.cases),
            _ => None,
        }
    }

    /// Bootstrap start ID for a resource collection.
    ///
    /// The nested `<resource>.start_id` wins over the legacy flat key. Empty
    /// strings count as unset.
    pub fn start_id(&self, stream: &str) -> Option<String> {
        let nested = self
            .resource(stream)
            .and_then(|r| r.start_id.clone())
            .none_if_empty();
        if nested.is_some() {
            return nested;
        }

        match stream {
            "inquiries" => self.start_inquiry_id.clone().none_if_empty(),
            "cases" => self.start_case_id.clone().none_if_empty(),
            _ => None,
        }
    }

    /// Configured override of the incomplete status set, if any
    pub fn incomplete_statuses(&self, stream: &str) -> Option<&[String]> {
        self.resource(stream)?.incomplete_statuses.as_deref()
    }
}

// ============================================================================
// Per-Resource Config
// ============================================================================

/// Settings scoped to one resource collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// ID to bootstrap the first run from
    #[serde(default)]
    pub start_id: Option<String>,

    /// Statuses that mark a record as still changing
    #[serde(default)]
    pub incomplete_statuses: Option<Vec<String>>,
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries for retryable failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-side request rate ceiling
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    5
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl HttpSettings {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let config = TapConfig::from_json_str(r#"{"api_key": "test_api_key_12345"}"#).unwrap();
        assert_eq!(config.api_key, "test_api_key_12345");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 100);
        assert!(config.start_date.is_none());
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = TapConfig::from_json_str(r#"{"base_url": "https://withpersona.com/api/v1"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api_key"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TapConfig::from_json_str(r#"{"api_key": "k", "page_size": 0}"#).unwrap_err();
        assert!(err.to_string().contains("page_size"));

        let err =
            TapConfig::from_json_str(r#"{"api_key": "k", "base_url": "ftp://x"}"#).unwrap_err();
        assert!(err.to_string().contains("base_url"));

        let err = TapConfig::from_json_str(r#"{"api_key": "k", "start_date": "yesterday"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_start_id_precedence() {
        let config: TapConfig = serde_json::from_value(json!({
            "api_key": "k",
            "start_inquiry_id": "inq_legacy",
            "start_case_id": "case_legacy",
            "inquiries": {"start_id": "inq_nested"},
            "cases": {"start_id": ""}
        }))
        .unwrap();

        assert_eq!(config.start_id("inquiries").as_deref(), Some("inq_nested"));
        assert_eq!(config.start_id("cases").as_deref(), Some("case_legacy"));
        assert_eq!(config.start_id("reports"), None);
    }

    #[test]
    fn test_incomplete_status_override() {
        let config: TapConfig = serde_json::from_value(json!({
            "api_key": "k",
            "cases": {"incomplete_statuses": ["Open"]}
        }))
        .unwrap();

        assert_eq!(
            config.incomplete_statuses("cases"),
            Some(&["Open".to_string()][..])
        );
        assert!(config.incomplete_statuses("inquiries").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = TapConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_key": "file_key", "page_size": 25}"#).unwrap();

        let config = TapConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key, "file_key");
        assert_eq!(config.page_size, 25);
    }
}
