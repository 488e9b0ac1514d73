//! Converts an amount between two currencies using the provider's latest rates

use chrono::NaiveDate;
use tracing::{debug, instrument};

use super::currency::{Amount, CurrencyCode, RateProvider};
use super::error::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: Amount,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionRequest {
    pub fn new(amount: Amount, from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { amount, from, to }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub request: ConversionRequest,
    pub rate: f64,
    pub date: NaiveDate,
    pub converted: f64,
}

pub struct Converter<'a> {
    provider: &'a dyn RateProvider,
}

impl<'a> Converter<'a> {
    pub fn new(provider: &'a dyn RateProvider) -> Self {
        Self { provider }
    }

    /// Fetches the rate table with the source currency as base and applies the
    /// target rate to the amount.
    #[instrument(
        name = "Convert",
        skip(self, request),
        fields(from = %request.from, to = %request.to)
    )]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ProviderError> {
        let table = self.provider.latest_rates(Some(&request.from), &[]).await?;

        if table.base != request.from {
            return Err(ProviderError::Malformed(format!(
                "requested rates for base {} but received base {}",
                request.from, table.base
            )));
        }

        let rate = table.rate(&request.to)?;
        let converted = request.amount.value() * rate;
        debug!(rate, converted, date = %table.date, "Applied rate");

        Ok(ConversionResult {
            request: request.clone(),
            rate,
            date: table.date,
            converted,
        })
    }
}
