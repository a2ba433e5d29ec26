//! Error taxonomy for rate retrieval and conversion

use crate::core::currency::CurrencyCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    /// Currency code was empty or whitespace.
    #[error("Currency code must not be blank")]
    InvalidCurrency,

    /// Currency is on the exclusion list.
    #[error("Currency {0} is not supported")]
    UnsupportedCurrency(CurrencyCode),

    /// Provider answer has no rate for the target currency.
    #[error("Rate not found for {base} to {target}")]
    RateNotFound {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// Converted amount does not fit in a decimal.
    #[error("Converting {amount} at rate {rate} overflows")]
    AmountOverflow { amount: Decimal, rate: Decimal },

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Page and page size must be at least 1, got page {page} with size {page_size}")]
    InvalidPagination { page: usize, page_size: usize },

    /// Transport or parsing failure in the upstream provider.
    #[error("Exchange rate provider '{provider}' failed: {source:#}")]
    ExternalProvider {
        provider: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type RateResult<T> = Result<T, RateError>;
