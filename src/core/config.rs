//! Session configuration for Foundry
//!
//! The session lives in `config.toml` under the Foundry home directory
//! (`$FOUNDRY_HOME`, or the platform config directory). Environment
//! variables override individual values. Commands only ever see the
//! session through the read-only [`ConfigReader`] trait.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::{FoundryError, FoundryResult};

/// Name of the session file inside the Foundry home directory
pub const CONFIG_FILE: &str = "config.toml";

/// Read-only view of the current session
pub trait ConfigReader: Send + Sync {
    /// API endpoint of the targeted platform, if one is set
    fn api_endpoint(&self) -> Option<&str>;

    /// Access token of the logged-in user, if any
    fn access_token(&self) -> Option<&str>;

    /// Name of the logged-in user, taken from the access token
    fn username(&self) -> String;

    /// Skip TLS certificate verification against the API endpoint
    fn skip_ssl_validation(&self) -> bool;

    /// Timeout applied to every API request
    fn request_timeout(&self) -> Duration;
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Targeted platform
    pub target: TargetConfig,

    /// Credentials of the current session
    pub session: SessionConfig,

    /// Network configuration
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// API endpoint, e.g. `https://api.example.com`
    pub api_endpoint: Option<String>,

    /// Skip SSL verification (dangerous!)
    pub skip_ssl_validation: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bearer access token
    pub access_token: Option<String>,

    /// Refresh token, kept for tooling that renews the session
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { timeout: 30 }
    }
}

impl Config {
    /// Load the session from the default Foundry home directory
    pub fn load_default() -> FoundryResult<Self> {
        let home = Self::home_dir()?;
        Self::load(&home)
    }

    /// Load the session from `dir` and apply environment overrides
    pub fn load(dir: &Path) -> FoundryResult<Self> {
        let mut config = Config::default();

        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            config = toml::from_str(&content)?;
            tracing::debug!("loaded session from {}", path.display());
        }

        Ok(config.apply_env_overrides())
    }

    /// Resolve the Foundry home directory
    pub fn home_dir() -> FoundryResult<PathBuf> {
        if let Ok(home) = env::var("FOUNDRY_HOME") {
            return Ok(PathBuf::from(home));
        }

        let project_dirs = ProjectDirs::from("org", "foundry", "foundry")
            .ok_or_else(|| FoundryError::config("Could not determine config directory"))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(api) = env::var("FOUNDRY_API") {
            self.target.api_endpoint = Some(api);
        }

        if let Ok(token) = env::var("FOUNDRY_ACCESS_TOKEN") {
            self.session.access_token = Some(token);
        }

        if let Ok(skip) = env::var("FOUNDRY_SKIP_SSL_VALIDATION") {
            self.target.skip_ssl_validation = skip == "1" || skip.to_lowercase() == "true";
        }

        if let Ok(timeout) = env::var("FOUNDRY_TIMEOUT") {
            match timeout.parse() {
                Ok(n) => self.network.timeout = n,
                Err(_) => tracing::warn!("ignoring invalid FOUNDRY_TIMEOUT value {:?}", timeout),
            }
        }

        self
    }
}

impl ConfigReader for Config {
    fn api_endpoint(&self) -> Option<&str> {
        self.target
            .api_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
    }

    fn access_token(&self) -> Option<&str> {
        self.session
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    fn username(&self) -> String {
        self.access_token()
            .and_then(username_from_token)
            .unwrap_or_default()
    }

    fn skip_ssl_validation(&self) -> bool {
        self.target.skip_ssl_validation
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }
}

/// Extract the `user_name` claim from a JWT access token.
///
/// Accepts tokens with or without the `bearer ` prefix. Returns `None` when
/// the token is not a JWT or carries no user name.
pub fn username_from_token(token: &str) -> Option<String> {
    let token = token
        .strip_prefix("bearer ")
        .or_else(|| token.strip_prefix("Bearer "))
        .unwrap_or(token);

    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    claims
        .get("user_name")
        .and_then(|name| name.as_str())
        .map(str::to_string)
}
