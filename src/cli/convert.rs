use super::ui;
use crate::core::{ConversionRequest, ConversionResult, Converter, RateProvider};
use anyhow::{Context, Result};

pub async fn run(
    provider: &dyn RateProvider,
    request: &ConversionRequest,
    precision: usize,
    detailed: bool,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching {} rates", request.from));
    let result = Converter::new(provider).convert(request).await;
    spinner.finish_and_clear();

    let result = result.with_context(|| {
        format!(
            "Failed to convert {} {} to {}",
            request.amount.value(),
            request.from,
            request.to
        )
    })?;

    println!("{}", render(&result, precision, detailed));
    Ok(())
}

/// Formats a conversion. The plain form is just the converted number so it
/// can be consumed by scripts.
pub fn render(result: &ConversionResult, precision: usize, detailed: bool) -> String {
    let converted = format!("{:.precision$}", result.converted);
    if !detailed {
        return converted;
    }

    let request = &result.request;
    let headline = format!(
        "{:.precision$} {} = {}",
        request.amount.value(),
        request.from,
        ui::style_text(&format!("{converted} {}", request.to), ui::StyleType::Value),
    );
    let rate_line = ui::style_text(
        &format!(
            "1 {} = {:.6} {} (rates as of {})",
            request.from, result.rate, request.to, result.date
        ),
        ui::StyleType::Subtle,
    );
    format!("{headline}\n{rate_line}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(converted: f64) -> ConversionResult {
        ConversionResult {
            request: ConversionRequest::new(
                "100".parse().unwrap(),
                "USD".parse().unwrap(),
                "EUR".parse().unwrap(),
            ),
            rate: 0.92,
            date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            converted,
        }
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(render(&result(92.00000000000001), 2, false), "92.00");
        assert_eq!(render(&result(92.123456), 4, false), "92.1235");
        assert_eq!(render(&result(92.4), 0, false), "92");
    }

    #[test]
    fn test_render_detailed() {
        let output = console::strip_ansi_codes(&render(&result(92.0), 2, true)).to_string();
        assert_eq!(
            output,
            "100.00 USD = 92.00 EUR\n1 USD = 0.920000 EUR (rates as of 2024-02-29)"
        );
    }
}
