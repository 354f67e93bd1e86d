//! Client configuration
//!
//! Settings are read from an optional TOML file and then overridden by
//! environment variables:
//!
//! - `JOBTRACK_API_URL` (default: `http://127.0.0.1:8000/api/`)
//! - `JOBTRACK_API_TOKEN` (default: none)
//! - `JOBTRACK_TIMEOUT_SECS` (default: `30`)
//! - `JOBTRACK_CONFIG` selects the TOML file (default: `jobtrack.toml`)

use jobtrack_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "jobtrack.toml";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint is joined onto; always ends with `/`
    pub base_url: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> EngineResult<Self> {
        let path = std::env::var("JOBTRACK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path, |key| std::env::var(key).ok())
    }

    /// Load configuration from `path` (if it exists) and apply overrides
    /// from `lookup`.
    pub fn load_from(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let mut config = if path.exists() {
            tracing::debug!("Reading client configuration from {:?}", path);
            let text = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Self::from_toml(&text)?
        } else {
            Self::default()
        };

        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> EngineResult<Self> {
        toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    /// Apply environment-style overrides
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> EngineResult<()> {
        if let Some(url) = lookup("JOBTRACK_API_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup("JOBTRACK_API_TOKEN") {
            self.token = if token.is_empty() { None } else { Some(token) };
        }
        if let Some(secs) = lookup("JOBTRACK_TIMEOUT_SECS") {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                EngineError::InvalidConfig(format!(
                    "JOBTRACK_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
        }
        Ok(())
    }

    /// Check the settings and normalise the base URL
    pub fn validate(&mut self) -> EngineResult<()> {
        if self.base_url.is_empty() {
            return Err(EngineError::MissingConfig("base_url".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(EngineError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        if self.timeout_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("missing.toml"), env(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_file_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"https://jobs.example.com/api\"\ntoken = \"from-file\"\ntimeout_secs = 10"
        )
        .unwrap();

        let config = ClientConfig::load_from(file.path(), env(&[])).unwrap();
        assert_eq!(config.base_url, "https://jobs.example.com/api/");
        assert_eq!(config.token.as_deref(), Some("from-file"));
        assert_eq!(config.timeout_secs, 10);

        let config = ClientConfig::load_from(
            file.path(),
            env(&[("JOBTRACK_API_TOKEN", "from-env"), ("JOBTRACK_TIMEOUT_SECS", "5")]),
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("from-env"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_empty_token_clears() {
        let mut config = ClientConfig::default().with_token("abc");
        config
            .apply_overrides(env(&[("JOBTRACK_API_TOKEN", "")]))
            .unwrap();
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_overrides(env(&[("JOBTRACK_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let mut config = ClientConfig::default().with_base_url("ftp://example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ClientConfig::from_toml("base_url = [").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }
}
