pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::rates::HistoricalQuery;
use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::AppConfig;
use crate::core::{ConversionService, CurrencyPolicy, ExchangeRateService};
use crate::providers::ProviderRegistry;
use crate::store::KeyValueStore;
use crate::store::memory::MemoryCollection;
use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: Decimal,
        from: String,
        to: String,
    },
    Rates {
        base: String,
        historical: Option<HistoricalQuery>,
    },
    Check {
        codes: Vec<String>,
    },
}

/// Services wired from one configuration.
pub struct App {
    pub rates: Arc<ExchangeRateService>,
    pub conversion: ConversionService,
    _store: KeyValueStore,
}

impl App {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config.providers)?;
        let provider = registry.get(&config.provider)?;

        let store = if config.cache.persist {
            KeyValueStore::new(&config.default_data_path()?)
        } else {
            KeyValueStore::in_memory()
        };
        let collection_name = format!("rates_{}", provider.name());
        let cache: Arc<dyn KeyValueCollection> = store
            .get_collection(&collection_name, config.cache.persist, true)
            .unwrap_or_else(|| {
                debug!("Falling back to memory cache for {}", collection_name);
                Arc::new(MemoryCollection::new())
            });

        let policy = Arc::new(CurrencyPolicy::new(&config.excluded_currencies));
        let rates = Arc::new(
            ExchangeRateService::new(provider, cache, policy)
                .with_ttls(config.cache.latest_ttl(), config.cache.historical_ttl()),
        );
        let conversion = ConversionService::new(Arc::clone(&rates));

        Ok(App {
            rates,
            conversion,
            _store: store,
        })
    }

    /// Runs `command` and returns the rendered output.
    pub async fn execute(&self, command: AppCommand) -> Result<String> {
        match command {
            AppCommand::Convert { amount, from, to } => {
                cli::convert::run(&self.conversion, amount, &from, &to).await
            }
            AppCommand::Rates { base, historical } => {
                cli::rates::run(&self.rates, &base, historical).await
            }
            AppCommand::Check { codes } => Ok(cli::check::run(&self.conversion, &codes).await),
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(&config)?;
    let output = app.execute(command).await?;
    println!("{output}");
    Ok(())
}
