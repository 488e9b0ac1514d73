//! Currency codes, amounts, rate tables and the rate provider abstraction

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use super::error::ProviderError;

/// A three letter currency code such as `USD`, always stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(code.to_ascii_uppercase()))
        } else {
            Err(anyhow!(
                "Invalid currency code: {:?} (expected three letters, e.g. USD)",
                s
            ))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.0
    }
}

/// A finite, non-negative amount of money.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(anyhow!("Invalid amount: {} is not a finite number", value));
        }
        if value < 0.0 {
            return Err(anyhow!("Invalid amount: {} is negative", value));
        }
        // Normalise -0.0 to 0.0
        Ok(Amount(value + 0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid amount: {:?} is not a number", s))?;
        Amount::new(value)
    }
}

/// Latest rates relative to `base`, as quoted by a provider on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: CurrencyCode,
    pub date: NaiveDate,
    pub rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    /// Looks up the multiplier for `code`. The base itself always resolves to 1.
    pub fn rate(&self, code: &CurrencyCode) -> Result<f64, ProviderError> {
        match self.rates.get(code) {
            Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
            Some(rate) => Err(ProviderError::Malformed(format!(
                "rate {rate} for {code} is not a positive number"
            ))),
            None if *code == self.base => Ok(1.0),
            None => Err(ProviderError::UnknownCurrency {
                code: code.clone(),
                base: self.base.clone(),
            }),
        }
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates. `base` defaults to the provider's own base
    /// currency; an empty `symbols` slice requests every currency.
    async fn latest_rates(
        &self,
        base: Option<&CurrencyCode>,
        symbols: &[CurrencyCode],
    ) -> Result<RateTable, ProviderError>;

    /// Lists supported currency codes and their names.
    async fn symbols(&self) -> Result<BTreeMap<CurrencyCode, String>, ProviderError>;
}
