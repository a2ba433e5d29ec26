use super::ui;
use crate::core::ConversionService;
use comfy_table::Cell;
use futures::future::join_all;

/// Checks every code concurrently and renders a supported/unsupported table.
pub async fn run(conversion: &ConversionService, codes: &[String]) -> String {
    let pb = ui::new_spinner("Checking currencies...");
    let checks = codes.iter().map(|code| async move {
        (
            code.trim().to_uppercase(),
            conversion.is_currency_supported(code).await,
        )
    });
    let results = join_all(checks).await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Supported")]);
    for (code, supported) in &results {
        table.add_row(vec![Cell::new(code), ui::supported_cell(*supported)]);
    }
    table.to_string()
}
