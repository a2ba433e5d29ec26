//! Validation rules applied to every currency argument before any I/O.

use crate::core::currency::{CurrencyCode, ExchangeRate, RateMap};
use crate::core::error::{RateError, RateResult};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::warn;

/// Currencies quoted by no operation unless configuration says otherwise.
pub const DEFAULT_EXCLUDED_CURRENCIES: [&str; 4] = ["TRY", "PLN", "THB", "MXN"];

#[derive(Debug, Clone)]
pub struct CurrencyPolicy {
    excluded: HashSet<CurrencyCode>,
}

impl CurrencyPolicy {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CurrencyPolicy {
            excluded: excluded
                .into_iter()
                .map(|code| CurrencyCode::new(code.as_ref()))
                .filter(|code| !code.is_blank())
                .collect(),
        }
    }

    /// Normalizes `code`, rejecting blank and excluded currencies.
    pub fn validate(&self, code: &str) -> RateResult<CurrencyCode> {
        let code = CurrencyCode::new(code);
        if code.is_blank() {
            return Err(RateError::InvalidCurrency);
        }
        if self.excluded.contains(&code) {
            return Err(RateError::UnsupportedCurrency(code));
        }
        Ok(code)
    }

    pub fn is_excluded(&self, code: &CurrencyCode) -> bool {
        self.excluded.contains(code)
    }

    /// Sorted view of the exclusion list.
    pub fn excluded(&self) -> Vec<&CurrencyCode> {
        let mut codes: Vec<_> = self.excluded.iter().collect();
        codes.sort();
        codes
    }

    /// Drops excluded currencies and rates that are not strictly positive.
    pub(crate) fn filter_rate_map(&self, mut rates: RateMap) -> RateMap {
        rates.retain(|code, rate| !self.is_excluded(code) && is_usable_rate(code, *rate));
        rates
    }

    pub(crate) fn filter_rates(&self, rates: Vec<ExchangeRate>) -> Vec<ExchangeRate> {
        rates
            .into_iter()
            .filter(|r| {
                !self.is_excluded(&r.base_currency)
                    && !self.is_excluded(&r.target_currency)
                    && is_usable_rate(&r.target_currency, r.rate)
            })
            .collect()
    }
}

fn is_usable_rate(code: &CurrencyCode, rate: Decimal) -> bool {
    if rate > Decimal::ZERO {
        return true;
    }
    warn!("Ignoring non-positive rate {} for {}", rate, code);
    false
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_CURRENCIES)
    }
}
