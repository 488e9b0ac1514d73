use super::ui;
use crate::core::{CurrencyCode, RateProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::collections::BTreeMap;

pub async fn run(provider: &dyn RateProvider) -> Result<()> {
    let spinner = ui::new_spinner("Fetching supported currencies");
    let symbols = provider.symbols().await;
    spinner.finish_and_clear();

    let symbols = symbols.context("Failed to fetch supported currencies")?;
    println!("{}", render(&symbols));
    Ok(())
}

pub fn render(symbols: &BTreeMap<CurrencyCode, String>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for (code, name) in symbols {
        table.add_row(vec![Cell::new(code), Cell::new(name)]);
    }

    let footer = ui::style_text(
        &format!("{} currencies supported", symbols.len()),
        ui::StyleType::Subtle,
    );
    format!("{table}\n{footer}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_symbols() {
        let symbols = BTreeMap::from([
            ("USD".parse().unwrap(), "United States Dollar".to_string()),
            ("EUR".parse().unwrap(), "Euro".to_string()),
        ]);

        let output = console::strip_ansi_codes(&render(&symbols)).to_string();
        assert!(output.contains("United States Dollar"));
        assert!(output.find("EUR").unwrap() < output.find("USD").unwrap());
        assert!(output.ends_with("2 currencies supported"));
    }
}
