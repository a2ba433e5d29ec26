//! Currency codes, exchange rates and the rate provider abstraction

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// An ISO 4217 style currency code, normalized to trimmed uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalizes `code` without checking its format.
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_uppercase())
    }

    /// Parses a user supplied code, requiring exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = Self::new(code);
        if normalized.0.len() != 3 || !normalized.0.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow!(
                "Invalid currency code '{}': expected three letters, e.g. EUR",
                code.trim()
            ));
        }
        Ok(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        CurrencyCode::new(&s)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        CurrencyCode::new(s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Rates for a single base currency on a single date, keyed by target currency.
pub type RateMap = HashMap<CurrencyCode, Decimal>;

/// A quoted rate: one unit of `base_currency` buys `rate` units of `target_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base_currency: CurrencyCode,
    pub target_currency: CurrencyCode,
    pub rate: Decimal,
    pub date: NaiveDate,
    pub last_updated: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(
        base_currency: CurrencyCode,
        target_currency: CurrencyCode,
        rate: Decimal,
        date: NaiveDate,
        last_updated: DateTime<Utc>,
    ) -> Self {
        ExchangeRate {
            base_currency,
            target_currency,
            rate,
            date,
            last_updated,
        }
    }
}

/// Upstream source of exchange rates.
///
/// Implementations only talk to their backend; caching and currency policy are
/// applied by [`crate::core::rates::ExchangeRateService`].
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Today's rates from `base` to every currency the provider knows.
    async fn get_latest(&self, base: &CurrencyCode) -> Result<RateMap>;

    /// Daily rates from `base` between `start` and `end` inclusive, ordered by date.
    async fn get_historical(
        &self,
        base: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExchangeRate>>;
}
