use crate::core::policy::DEFAULT_EXCLUDED_CURRENCIES;
use crate::core::rates::{HISTORICAL_RATES_TTL, LATEST_RATES_TTL};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_PROVIDER: &str = "frankfurter";
pub const FRANKFURTER_BASE_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FrankfurterProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Frankfurter(FrankfurterProviderConfig),
}

/// Named provider instances; the active one is picked by `AppConfig::provider`.
pub type ProvidersConfig = BTreeMap<String, ProviderConfig>;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_persist")]
    pub persist: bool,
    #[serde(default = "default_latest_ttl_secs")]
    pub latest_ttl_secs: u64,
    #[serde(default = "default_historical_ttl_secs")]
    pub historical_ttl_secs: u64,
}

impl CacheConfig {
    pub fn latest_ttl(&self) -> Duration {
        Duration::from_secs(self.latest_ttl_secs)
    }

    pub fn historical_ttl(&self) -> Duration {
        Duration::from_secs(self.historical_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            persist: default_persist(),
            latest_ttl_secs: default_latest_ttl_secs(),
            historical_ttl_secs: default_historical_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_providers")]
    pub providers: ProvidersConfig,
    #[serde(default = "default_excluded_currencies")]
    pub excluded_currencies: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: default_provider(),
            providers: default_providers(),
            excluded_currencies: default_excluded_currencies(),
            cache: CacheConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or defaults when there is none.
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

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "xrate", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "xrate", "xrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_providers() -> ProvidersConfig {
    BTreeMap::from([(
        DEFAULT_PROVIDER.to_string(),
        ProviderConfig::Frankfurter(FrankfurterProviderConfig {
            base_url: FRANKFURTER_BASE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }),
    )])
}

fn default_excluded_currencies() -> Vec<String> {
    DEFAULT_EXCLUDED_CURRENCIES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_persist() -> bool {
    true
}

fn default_latest_ttl_secs() -> u64 {
    LATEST_RATES_TTL.as_secs()
}

fn default_historical_ttl_secs() -> u64 {
    HISTORICAL_RATES_TTL.as_secs()
}
