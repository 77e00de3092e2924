//! Configuration management for the Pemilu client

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Runtime configuration for [`crate::http::ApiClient`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL prepended to every API path (e.g. `https://host/api`)
    pub api_base_url: String,
    /// Base URL for non-prefixed endpoints such as the CSRF cookie bootstrap
    pub app_base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Where the CLI persists its session between invocations
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            app_base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            user_agent: format!("pemilu-client/{}", env!("CARGO_PKG_VERSION")),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URLs with default settings otherwise
    pub fn new(api_base_url: impl Into<String>, app_base_url: impl Into<String>) -> Result<Self> {
        let mut config = Self {
            api_base_url: api_base_url.into(),
            app_base_url: app_base_url.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks both base URLs parse and strips trailing slashes
    pub fn validate(&mut self) -> Result<()> {
        self.api_base_url = normalize_base(&self.api_base_url, "api_base_url")?;
        self.app_base_url = normalize_base(&self.app_base_url, "app_base_url")?;
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn normalize_base(raw: &str, field: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| ClientError::Config(format!("Invalid {field} '{raw}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "Invalid {field} '{raw}': scheme must be http or https"
        )));
    }
    Ok(trimmed.to_string())
}

/// File-based configuration structure
#[derive(Debug, Deserialize)]
struct FileConfig {
    api: Option<ApiSection>,
    session: Option<SessionSection>,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
    app_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    file: Option<PathBuf>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path).map_err(ClientError::Io)?;
    parse_config(&content)
}

/// Parses TOML configuration text and merges with defaults
pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let file_config: FileConfig = toml::from_str(content)?;

    let mut config = ClientConfig::default();

    if let Some(api) = file_config.api {
        if let Some(base) = api.base_url {
            config.api_base_url = base;
        }
        if let Some(app) = api.app_url {
            config.app_base_url = app;
        }
        if let Some(timeout) = api.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(ua) = api.user_agent {
            config.user_agent = ua;
        }
    }

    if let Some(session) = file_config.session {
        config.session_file = session.file;
    }

    config.validate()?;
    Ok(config)
}

/// Merges CLI arguments into an existing ClientConfig
pub fn merge_cli_args(
    config: &mut ClientConfig,
    api_url: Option<String>,
    app_url: Option<String>,
    timeout: Option<u64>,
    session_file: Option<PathBuf>,
) -> Result<()> {
    if let Some(url) = api_url {
        config.api_base_url = url;
    }
    if let Some(url) = app_url {
        config.app_base_url = url;
    }
    if let Some(t) = timeout {
        config.timeout_secs = t;
    }
    if let Some(path) = session_file {
        config.session_file = Some(path);
    }
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [api]
            base_url = "https://pemilu.example.ac.id/api/"
            app_url = "https://pemilu.example.ac.id"
            timeout_secs = 5
            user_agent = "Pemilu-Test"

            [session]
            file = "/tmp/pemilu-session.json"
        "#;

        let config = parse_config(toml).expect("valid config");
        assert_eq!(config.api_base_url, "https://pemilu.example.ac.id/api");
        assert_eq!(config.app_base_url, "https://pemilu.example.ac.id");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.user_agent, "Pemilu-Test");
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/tmp/pemilu-session.json"))
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").expect("empty config is valid");
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.app_base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let toml = r#"
            [api]
            base_url = "not a url"
        "#;
        let err = parse_config(toml).expect_err("should reject");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = ClientConfig::new("ftp://host/api", "http://host").expect_err("should reject");
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = ClientConfig::default();
        merge_cli_args(
            &mut config,
            Some("https://other.host/api/".to_string()),
            None,
            Some(3),
            Some(PathBuf::from("session.json")),
        )
        .expect("valid overrides");

        assert_eq!(config.api_base_url, "https://other.host/api");
        assert_eq!(config.app_base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.session_file, Some(PathBuf::from("session.json")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ClientConfig::default();
        let err = merge_cli_args(&mut config, None, None, Some(0), None).expect_err("zero timeout");
        assert!(matches!(err, ClientError::Config(_)));
    }
}
