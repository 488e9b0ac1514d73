use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::{FixerProviderConfig, KeyPlacement};
use crate::core::{CurrencyCode, ProviderError, RateProvider, RateTable};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// FixerProvider implementation for RateProvider
pub struct FixerProvider {
    base_url: String,
    api_key: Option<String>,
    key_placement: KeyPlacement,
    client: reqwest::Client,
}

impl FixerProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        key_placement: KeyPlacement,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("fxconv/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(FixerProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            key_placement,
            client,
        })
    }

    pub fn from_config(
        config: &FixerProviderConfig,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        Self::new(&config.base_url, api_key, config.key_placement)
    }

    /// Issues a GET against `endpoint` and returns the body of a 2xx response.
    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if self.key_placement == KeyPlacement::Query {
            query.push(("access_key", api_key));
        }

        let raw_url = format!("{}/{}", self.base_url, endpoint);
        let url = reqwest::Url::parse_with_params(&raw_url, &query)
            .map_err(|e| ProviderError::InvalidUrl(format!("{raw_url}: {e}")))?;
        debug!(url = %raw_url, ?params, "Requesting rate provider");

        let mut request = self.client.get(url);
        if self.key_placement == KeyPlacement::Header {
            request = request.header("apikey", api_key);
        }

        // reqwest errors embed the request URL, which may carry the key
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url()))?;
        debug!(%status, bytes = body.len(), "Received rate provider response");

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                message: describe_error_body(&body),
            });
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct FixerError {
    #[serde(default)]
    code: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    success: bool,
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: String,
    date: NaiveDate,
    rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    symbols: BTreeMap<String, String>,
}

/// Extracts a human readable message from a non-2xx response body.
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error
            .info
            .or(error.kind)
            .unwrap_or_else(|| format!("error code {}", error.code)),
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.trim().chars().take(200).collect(),
    }
}

/// Decodes a Fixer envelope, turning `success: false` into a rejection.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    let envelope: StatusEnvelope = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("failed to parse JSON response: {e}")))?;

    if !envelope.success {
        let (code, kind, info) = match envelope.error {
            Some(error) => (
                error.code,
                error.kind.unwrap_or_else(|| "unknown_error".to_string()),
                error
                    .info
                    .unwrap_or_else(|| "An unknown error occurred".to_string()),
            ),
            None => (
                0,
                "unknown_error".to_string(),
                "An unknown error occurred".to_string(),
            ),
        };
        return Err(ProviderError::Rejected { code, kind, info });
    }

    serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("failed to parse JSON response: {e}")))
}

fn parse_code(raw: &str) -> Result<CurrencyCode, ProviderError> {
    raw.parse()
        .map_err(|_| ProviderError::Malformed(format!("invalid currency code {raw:?}")))
}

fn join_codes(codes: &[CurrencyCode]) -> String {
    codes
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl RateProvider for FixerProvider {
    #[instrument(name = "FixerLatestRates", skip(self, symbols))]
    async fn latest_rates(
        &self,
        base: Option<&CurrencyCode>,
        symbols: &[CurrencyCode],
    ) -> Result<RateTable, ProviderError> {
        let mut params = Vec::new();
        if let Some(base) = base {
            params.push(("base", base.to_string()));
        }
        if !symbols.is_empty() {
            params.push(("symbols", join_codes(symbols)));
        }

        let body = self.get("latest", &params).await?;
        let data: LatestResponse = decode(&body)?;

        let mut rates = BTreeMap::new();
        for (raw, rate) in data.rates {
            match raw.parse::<CurrencyCode>() {
                Ok(code) => {
                    rates.insert(code, rate);
                }
                Err(_) => debug!(code = %raw, "Skipping unsupported currency code"),
            }
        }

        Ok(RateTable {
            base: parse_code(&data.base)?,
            date: data.date,
            rates,
        })
    }

    #[instrument(name = "FixerSymbols", skip(self))]
    async fn symbols(&self) -> Result<BTreeMap<CurrencyCode, String>, ProviderError> {
        let body = self.get("symbols", &[]).await?;
        let data: SymbolsResponse = decode(&body)?;

        Ok(data
            .symbols
            .into_iter()
            .filter_map(|(raw, name)| raw.parse::<CurrencyCode>().ok().map(|code| (code, name)))
            .collect())
    }
}
