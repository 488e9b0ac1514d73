use super::ui;
use crate::core::{CurrencyCode, RateProvider, RateTable};
use anyhow::{Context, Result};
use comfy_table::Cell;

pub async fn run(
    provider: &dyn RateProvider,
    base: Option<&CurrencyCode>,
    symbols: &[CurrencyCode],
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching latest rates");
    let table = provider.latest_rates(base, symbols).await;
    spinner.finish_and_clear();

    let table = table.context("Failed to fetch latest exchange rates")?;
    println!("{}", render(&table));
    Ok(())
}

pub fn render(table: &RateTable) -> String {
    let title = ui::style_text(
        &format!("Base: {}    Date: {}", table.base, table.date),
        ui::StyleType::Title,
    );

    if table.rates.is_empty() {
        return format!("{title}\nNo rates returned.");
    }

    let mut rates_table = ui::new_styled_table();
    rates_table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (code, rate) in &table.rates {
        rates_table.add_row(vec![Cell::new(code), ui::rate_cell(*rate)]);
    }

    format!("{title}\n{rates_table}")
}
