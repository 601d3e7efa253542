use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://data.fixer.io/api/latest";

pub const ENV_API_URL: &str = "FXCONV_API_URL";
pub const ENV_API_KEY: &str = "FXCONV_API_KEY";
pub const ENV_API_HOST: &str = "FXCONV_API_HOST";

/// Where the API key is sent on each request.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyLocation {
    #[default]
    Query,
    Header,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default)]
    pub key_location: KeyLocation,
    /// Query parameter or header name carrying the key. Defaults to
    /// `access_key` for query and `apikey` for header placement.
    #[serde(default)]
    pub key_name: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_source() -> String {
    "USD".to_string()
}

fn default_target() -> String {
    "EUR".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            api_key: None,
            api_host: None,
            key_location: KeyLocation::default(),
            key_name: None,
        }
    }
}

impl ProviderConfig {
    pub fn key_name(&self) -> &str {
        match (&self.key_name, self.key_location) {
            (Some(name), _) => name.as_str(),
            (None, KeyLocation::Query) => "access_key",
            (None, KeyLocation::Header) => "apikey",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_target")]
    pub target: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            source: default_source(),
            target: default_target(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file if present, falling back to defaults.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Loads config from `config_path` or the default location, then applies
    /// environment overrides.
    pub fn resolve(config_path: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Overrides provider settings with non-empty values from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(ENV_API_URL) {
            debug!("Using API URL from {ENV_API_URL}");
            self.provider.base_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            debug!("Using API key from {ENV_API_KEY}");
            self.provider.api_key = Some(key);
        }
        if let Some(host) = lookup(ENV_API_HOST) {
            debug!("Using API host from {ENV_API_HOST}");
            self.provider.api_host = Some(host);
        }
    }
}
