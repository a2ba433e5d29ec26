//! Core business logic: currency policy, rate retrieval and conversion

pub mod cache;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod error;
pub mod log;
pub mod pagination;
pub mod policy;
pub mod rates;

// Re-export main types for cleaner imports
pub use conversion::ConversionService;
pub use currency::{CurrencyCode, ExchangeRate, RateMap, RateProvider};
pub use error::{RateError, RateResult};
pub use policy::CurrencyPolicy;
pub use rates::ExchangeRateService;
