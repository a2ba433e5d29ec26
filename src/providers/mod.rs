pub mod frankfurter;
pub mod util;

use crate::core::RateProvider;
use crate::core::config::{ProviderConfig, ProvidersConfig};
use anyhow::{Result, anyhow};
use frankfurter::FrankfurterProvider;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Rate providers built once from configuration, looked up by name.
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn RateProvider>>,
}

impl ProviderRegistry {
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let mut providers: BTreeMap<String, Arc<dyn RateProvider>> = BTreeMap::new();
        for (name, provider_config) in config {
            let provider: Arc<dyn RateProvider> = match provider_config {
                ProviderConfig::Frankfurter(c) => Arc::new(FrankfurterProvider::new(name, c)?),
            };
            debug!("Configured rate provider {}", name);
            providers.insert(name.clone(), provider);
        }
        Ok(Self { providers })
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn RateProvider>> {
        self.providers.get(name).cloned().ok_or_else(|| {
            anyhow!(
                "Unknown rate provider '{}'. Configured providers: {}",
                name,
                self.names().join(", ")
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
