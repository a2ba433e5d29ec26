//! Property-based tests for paging, currency validation, caching and conversion.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use xrate::core::cache::KeyValueCollection;
use xrate::core::pagination::PageRequest;
use xrate::core::{
    ConversionService, CurrencyCode, CurrencyPolicy, ExchangeRate, ExchangeRateService, RateError,
    RateMap, RateProvider,
};
use xrate::store::memory::MemoryCollection;

/// Serves one fixed rate for every target.
struct FlatRateProvider {
    rate: Decimal,
}

#[async_trait]
impl RateProvider for FlatRateProvider {
    fn name(&self) -> &str {
        "flat"
    }

    async fn get_latest(&self, _base: &CurrencyCode) -> Result<RateMap> {
        Ok(["EUR", "GBP", "JPY", "USD"]
            .into_iter()
            .map(|code| (CurrencyCode::new(code), self.rate))
            .collect())
    }

    async fn get_historical(
        &self,
        _base: &CurrencyCode,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<ExchangeRate>> {
        Ok(Vec::new())
    }
}

fn conversion_service(rate: Decimal) -> ConversionService {
    let rates = ExchangeRateService::new(
        Arc::new(FlatRateProvider { rate }),
        Arc::new(MemoryCollection::new()),
        Arc::new(CurrencyPolicy::default()),
    );
    ConversionService::new(Arc::new(rates))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// =============================================================================
// Generators
// =============================================================================

/// Positive amounts with up to four decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000, 0u32..=4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Positive rates with up to six decimal places.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000, 0u32..=6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn arb_supported_code() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("EUR"), Just("GBP"), Just("JPY"), Just("USD")]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn pages_partition_the_series(len in 0usize..200, page_size in 1usize..25) {
        let items: Vec<usize> = (0..len).collect();
        let total_pages = len.div_ceil(page_size);

        let mut joined = Vec::new();
        for page in 1..=total_pages + 1 {
            let chunk = PageRequest::new(page, page_size).unwrap().slice(items.clone());
            prop_assert!(chunk.len() <= page_size);
            if page > total_pages {
                prop_assert!(chunk.is_empty());
            }
            joined.extend(chunk);
        }
        prop_assert_eq!(joined, items);
    }

    #[test]
    fn zero_page_or_size_is_rejected(page in 0usize..3, page_size in 0usize..3) {
        let result = PageRequest::new(page, page_size);
        prop_assert_eq!(result.is_err(), page == 0 || page_size == 0);
    }

    #[test]
    fn validation_normalizes_case_and_whitespace(code in "[a-zA-Z]{3}", pad in " {0,3}") {
        let policy = CurrencyPolicy::new(Vec::<String>::new());
        let padded = format!("{pad}{code}{pad}");
        let validated = policy.validate(&padded).unwrap();
        prop_assert_eq!(validated.as_str(), code.to_uppercase());
    }

    #[test]
    fn excluded_codes_are_rejected_in_any_case(code in "(?i)(try|pln|thb|mxn)") {
        let policy = CurrencyPolicy::default();
        let rejected = matches!(
            policy.validate(&code),
            Err(RateError::UnsupportedCurrency(_))
        );
        prop_assert!(rejected);
    }

    #[test]
    fn memory_cache_keeps_last_write(
        writes in proptest::collection::vec(("[a-c]{1,2}", proptest::collection::vec(any::<u8>(), 0..16)), 1..20)
    ) {
        let rt = runtime();
        let cache = MemoryCollection::new();
        let mut expected: HashMap<String, Vec<u8>> = HashMap::new();

        rt.block_on(async {
            for (key, value) in &writes {
                assert!(cache.put(key.as_bytes(), value, Some(Duration::from_secs(900))).await);
                expected.insert(key.clone(), value.clone());
            }
        });

        for (key, value) in &expected {
            let stored = rt.block_on(cache.get(key.as_bytes()));
            prop_assert_eq!(stored.as_ref(), Some(value));
        }
    }

    #[test]
    fn conversion_is_rounded_to_four_places(amount in arb_amount(), rate in arb_rate(), to in arb_supported_code()) {
        let service = conversion_service(rate);
        let converted = runtime().block_on(service.convert(amount, "CHF", to)).unwrap();

        prop_assert!(converted.scale() <= 4);
        prop_assert!((converted - amount * rate).abs() <= Decimal::new(5, 5));
    }

    #[test]
    fn same_currency_returns_amount_unchanged(amount in arb_amount(), code in arb_supported_code()) {
        let service = conversion_service(Decimal::new(2, 0));
        let converted = runtime()
            .block_on(service.convert(amount, code, &code.to_lowercase()))
            .unwrap();
        prop_assert_eq!(converted, amount);
    }
}
