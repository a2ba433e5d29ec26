use super::ui;
use crate::core::ConversionService;
use anyhow::Result;
use rust_decimal::Decimal;

/// Converts `amount` and renders a one line summary.
pub async fn run(
    conversion: &ConversionService,
    amount: Decimal,
    from: &str,
    to: &str,
) -> Result<String> {
    let pb = ui::new_spinner("Fetching exchange rate...");
    let result = conversion.convert(amount, from, to).await;
    pb.finish_and_clear();

    let converted = result?;
    Ok(format!(
        "{} {} = {} {}",
        amount,
        from.trim().to_uppercase(),
        ui::style_text(&converted.to_string(), ui::StyleType::Value),
        ui::style_text(&to.trim().to_uppercase(), ui::StyleType::Label),
    ))
}
