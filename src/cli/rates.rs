use super::ui;
use crate::core::{CurrencyCode, ExchangeRate, ExchangeRateService, RateMap};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

/// Date range and page for a historical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub page: usize,
    pub page_size: usize,
}

fn latest_table(base: &str, provider: &str, rates: &RateMap, excluded: &[&CurrencyCode]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);

    let mut sorted: Vec<_> = rates.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    for (code, rate) in sorted {
        table.add_row(vec![Cell::new(code), ui::rate_cell(*rate)]);
    }

    let mut output = format!(
        "Latest rates for {} {}\n\n{}",
        ui::style_text(base, ui::StyleType::Title),
        ui::style_text(&format!("(via {provider})"), ui::StyleType::Subtle),
        table
    );
    if !excluded.is_empty() {
        let codes: Vec<&str> = excluded.iter().map(|code| code.as_str()).collect();
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&format!("Not quoted: {}", codes.join(", ")), ui::StyleType::Subtle)
        ));
    }
    output
}

fn historical_table(base: &str, query: &HistoricalQuery, rates: &[ExchangeRate]) -> String {
    let heading = format!(
        "Rates for {} from {} to {}, page {}",
        ui::style_text(base, ui::StyleType::Title),
        query.start,
        query.end,
        query.page
    );
    if rates.is_empty() {
        return format!(
            "{heading}\n\n{}",
            ui::style_text("No rates on this page", ui::StyleType::Subtle)
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
    ]);
    for rate in rates {
        table.add_row(vec![
            Cell::new(rate.date),
            Cell::new(&rate.target_currency),
            ui::rate_cell(rate.rate),
        ]);
    }

    format!("{heading}\n\n{table}")
}

/// Renders latest rates for `base`, or one page of a historical series.
pub async fn run(
    rates: &ExchangeRateService,
    base: &str,
    historical: Option<HistoricalQuery>,
) -> Result<String> {
    let base_display = base.trim().to_uppercase();
    let pb = ui::new_spinner("Fetching exchange rates...");

    let output = match historical {
        None => rates
            .get_latest_rates(base)
            .await
            .map(|latest| {
                latest_table(
                    &base_display,
                    rates.provider_name(),
                    &latest,
                    &rates.policy().excluded(),
                )
            }),
        Some(query) => rates
            .get_historical_rates(base, query.start, query.end, query.page, query.page_size)
            .await
            .map(|series| historical_table(&base_display, &query, &series)),
    };
    pb.finish_and_clear();

    Ok(output?)
}
