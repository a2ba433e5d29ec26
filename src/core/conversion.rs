//! Currency conversion on top of [`ExchangeRateService`].

use crate::core::error::{RateError, RateResult};
use crate::core::rates::ExchangeRateService;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decimal places kept in converted amounts.
pub const CONVERSION_SCALE: u32 = 4;

pub struct ConversionService {
    rates: Arc<ExchangeRateService>,
}

impl ConversionService {
    pub fn new(rates: Arc<ExchangeRateService>) -> Self {
        ConversionService { rates }
    }

    /// Converts `amount` of `from` into `to`, rounded half away from zero to
    /// [`CONVERSION_SCALE`] places.
    pub async fn convert(&self, amount: Decimal, from: &str, to: &str) -> RateResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(RateError::InvalidAmount(amount));
        }

        let policy = self.rates.policy();
        let from_code = policy.validate(from)?;
        let to_code = policy.validate(to)?;

        if from_code == to_code {
            debug!("No currency conversion needed for {from_code} -> {to_code}");
            return Ok(amount);
        }

        let rate = self
            .rates
            .get_rate(from_code.as_str(), to_code.as_str())
            .await?;
        let converted = amount
            .checked_mul(rate.rate)
            .ok_or(RateError::AmountOverflow {
                amount,
                rate: rate.rate,
            })?
            .round_dp_with_strategy(CONVERSION_SCALE, RoundingStrategy::MidpointAwayFromZero);
        debug!(
            "Converted {amount} from {from_code} to {to_code} at rate {}: {converted}",
            rate.rate
        );
        Ok(converted)
    }

    /// Whether latest rates can be served for `code`. Never fails.
    pub async fn is_currency_supported(&self, code: &str) -> bool {
        match self.rates.get_latest_rates(code).await {
            Ok(_) => true,
            Err(RateError::UnsupportedCurrency(_)) => false,
            Err(e) => {
                warn!("Could not determine support for currency '{}': {}", code, e);
                false
            }
        }
    }
}
