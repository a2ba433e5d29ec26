use crate::core::config::FrankfurterProviderConfig;
use crate::core::{CurrencyCode, ExchangeRate, RateMap, RateProvider};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Client for the Frankfurter API (ECB reference rates).
pub struct FrankfurterProvider {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterProvider {
    pub fn new(name: &str, config: &FrankfurterProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrate/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FrankfurterProvider {
            name: name.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, base: &CurrencyCode) -> Result<T> {
        let url = Url::parse_with_params(
            &format!("{}/{}", self.base_url, path),
            &[("from", base.as_str())],
        )
        .with_context(|| format!("Invalid provider URL: {}/{}", self.base_url, path))?;
        debug!("Requesting exchange rates from {}", url);

        let response = with_retry(
            || self.client.get(url.clone()).send(),
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Failed to send request for rates from {base}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response for rates from {base}"))?;

        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for rates from {}", status, base));
        }
        if text.trim().is_empty() {
            return Err(anyhow!("Received empty response for rates from {}", base));
        }

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse response for rates from {base}"))
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    rates: BTreeMap<NaiveDate, BTreeMap<CurrencyCode, Decimal>>,
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "FrankfurterLatest", skip(self), fields(base = %base))]
    async fn get_latest(&self, base: &CurrencyCode) -> Result<RateMap> {
        let data: LatestResponse = self.fetch("latest", base).await?;
        debug!("Received {} latest rates for {}", data.rates.len(), base);
        Ok(data.rates.into_iter().collect())
    }

    #[instrument(name = "FrankfurterHistorical", skip(self), fields(base = %base))]
    async fn get_historical(
        &self,
        base: &CurrencyCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExchangeRate>> {
        let data: TimeSeriesResponse = self.fetch(&format!("{start}..{end}"), base).await?;

        let fetched_at = Utc::now();
        let rates: Vec<ExchangeRate> = data
            .rates
            .into_iter()
            .flat_map(|(date, day)| {
                day.into_iter().map(move |(target, rate)| {
                    ExchangeRate::new(base.clone(), target, rate, date, fetched_at)
                })
            })
            .collect();
        debug!("Received {} historical rates for {}", rates.len(), base);
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(
        request_path: &str,
        base: &str,
        mock_response: &str,
        status_code: u16,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("from", base))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(uri: &str) -> FrankfurterProvider {
        FrankfurterProvider::new(
            "frankfurter",
            &FrankfurterProviderConfig {
                base_url: uri.to_string(),
                timeout_secs: 5,
            },
        )
        .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_successful_latest_fetch() {
        let mock_response = r#"{
            "amount": 1.0,
            "base": "EUR",
            "date": "2024-05-10",
            "rates": {"USD": 1.0772, "GBP": 0.86, "TRY": 34.71}
        }"#;
        let mock_server = create_mock_server("/latest", "EUR", mock_response, 200).await;

        let rates = provider(&mock_server.uri())
            .get_latest(&CurrencyCode::new("EUR"))
            .await
            .unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get(&CurrencyCode::new("USD")), Some(&dec!(1.0772)));
        assert_eq!(rates.get(&CurrencyCode::new("GBP")), Some(&dec!(0.86)));
    }

    #[tokio::test]
    async fn test_successful_historical_fetch_is_ordered() {
        let mock_response = r#"{
            "amount": 1.0,
            "base": "USD",
            "start_date": "2024-01-02",
            "end_date": "2024-01-03",
            "rates": {
                "2024-01-03": {"GBP": 0.79, "EUR": 0.915},
                "2024-01-02": {"EUR": 0.9123, "GBP": 0.787}
            }
        }"#;
        let mock_server =
            create_mock_server("/2024-01-01..2024-01-03", "USD", mock_response, 200).await;

        let rates = provider(&mock_server.uri())
            .get_historical(&CurrencyCode::new("usd"), date("2024-01-01"), date("2024-01-03"))
            .await
            .unwrap();

        let summary: Vec<_> = rates
            .iter()
            .map(|r| (r.date.to_string(), r.target_currency.to_string(), r.rate))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024-01-02".to_string(), "EUR".to_string(), dec!(0.9123)),
                ("2024-01-02".to_string(), "GBP".to_string(), dec!(0.787)),
                ("2024-01-03".to_string(), "EUR".to_string(), dec!(0.915)),
                ("2024-01-03".to_string(), "GBP".to_string(), dec!(0.79)),
            ]
        );
        assert!(rates.iter().all(|r| r.base_currency.as_str() == "USD"));
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server =
            create_mock_server("/latest", "XYZ", r#"{"message":"not found"}"#, 404).await;

        let result = provider(&mock_server.uri())
            .get_latest(&CurrencyCode::new("XYZ"))
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for rates from XYZ"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server =
            create_mock_server("/latest", "EUR", r#"{"base": "EUR", "rate": {}}"#, 200).await;

        let result = provider(&mock_server.uri())
            .get_latest(&CurrencyCode::new("EUR"))
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to parse response for rates from EUR"
        );
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mock_server = create_mock_server("/latest", "EUR", "", 200).await;

        let result = provider(&mock_server.uri())
            .get_latest(&CurrencyCode::new("EUR"))
            .await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Received empty response for rates from EUR"
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_response = r#"{"rates": {"USD": 1.1}}"#;
        let mock_server = create_mock_server("/latest", "EUR", mock_response, 200).await;

        let rates = provider(&format!("{}/", mock_server.uri()))
            .get_latest(&CurrencyCode::new("EUR"))
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
    }
}
