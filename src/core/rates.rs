//! Cache-aside retrieval of latest and historical exchange rates.

use crate::core::cache::KeyValueCollection;
use crate::core::currency::{CurrencyCode, ExchangeRate, RateMap, RateProvider};
use crate::core::error::{RateError, RateResult};
use crate::core::pagination::PageRequest;
use crate::core::policy::CurrencyPolicy;
use chrono::{NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const LATEST_RATES_TTL: Duration = Duration::from_secs(15 * 60);
pub const HISTORICAL_RATES_TTL: Duration = Duration::from_secs(60 * 60);

pub struct ExchangeRateService {
    provider: Arc<dyn RateProvider>,
    cache: Arc<dyn KeyValueCollection>,
    policy: Arc<CurrencyPolicy>,
    latest_ttl: Duration,
    historical_ttl: Duration,
}

impl ExchangeRateService {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        cache: Arc<dyn KeyValueCollection>,
        policy: Arc<CurrencyPolicy>,
    ) -> Self {
        ExchangeRateService {
            provider,
            cache,
            policy,
            latest_ttl: LATEST_RATES_TTL,
            historical_ttl: HISTORICAL_RATES_TTL,
        }
    }

    /// Overrides how long latest and historical answers stay cached.
    pub fn with_ttls(mut self, latest: Duration, historical: Duration) -> Self {
        self.latest_ttl = latest;
        self.historical_ttl = historical;
        self
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Latest rates from `base`, without excluded currencies.
    #[instrument(skip(self))]
    pub async fn get_latest_rates(&self, base: &str) -> RateResult<RateMap> {
        let base = self.policy.validate(base)?;
        self.latest_rates(&base).await
    }

    /// The latest `base` to `target` rate, stamped with the current date and time.
    #[instrument(skip(self))]
    pub async fn get_rate(&self, base: &str, target: &str) -> RateResult<ExchangeRate> {
        let base = self.policy.validate(base)?;
        let target = self.policy.validate(target)?;

        let rates = self.latest_rates(&base).await?;
        let rate = *rates.get(&target).ok_or_else(|| RateError::RateNotFound {
            base: base.clone(),
            target: target.clone(),
        })?;

        let now = Utc::now();
        Ok(ExchangeRate::new(base, target, rate, now.date_naive(), now))
    }

    /// One page of the daily series from `base` between `start` and `end`.
    ///
    /// Exclusions are removed before paging, so page boundaries only count
    /// quotable rates.
    #[instrument(skip(self))]
    pub async fn get_historical_rates(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: usize,
        page_size: usize,
    ) -> RateResult<Vec<ExchangeRate>> {
        let base = self.policy.validate(base)?;
        if start > end {
            return Err(RateError::InvalidRange { start, end });
        }
        let page = PageRequest::new(page, page_size)?;

        let key = format!("historical_rates_{base}_{start}_{end}");
        let rates = match self.read_cached::<Vec<ExchangeRate>>(&key).await {
            Some(cached) => cached,
            None => {
                let fetched = self
                    .provider
                    .get_historical(&base, start, end)
                    .await
                    .map_err(|e| self.provider_error(e))?;
                self.write_cached(&key, &fetched, self.historical_ttl).await;
                fetched
            }
        };

        Ok(page.slice(self.policy.filter_rates(rates)))
    }

    async fn latest_rates(&self, base: &CurrencyCode) -> RateResult<RateMap> {
        let key = format!("latest_rates_{base}");
        if let Some(cached) = self.read_cached::<RateMap>(&key).await {
            return Ok(self.policy.filter_rate_map(cached));
        }

        let fetched = self
            .provider
            .get_latest(base)
            .await
            .map_err(|e| self.provider_error(e))?;
        // Stored unfiltered; the exclusion list is applied on every read.
        self.write_cached(&key, &fetched, self.latest_ttl).await;

        Ok(self.policy.filter_rate_map(fetched))
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.cache.get(key.as_bytes()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!("Using cached rates for {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                self.cache.remove(key.as_bytes()).await;
                None
            }
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize rates for cache key {}: {}", key, e);
                return;
            }
        };
        if !self.cache.put(key.as_bytes(), &bytes, Some(ttl)).await {
            warn!("Rates for {} were not cached", key);
        }
    }

    fn provider_error(&self, source: anyhow::Error) -> RateError {
        warn!(provider = self.provider.name(), error = %source, "Rate provider failed");
        RateError::ExternalProvider {
            provider: self.provider.name().to_string(),
            source,
        }
    }
}
