use thiserror::Error;

use super::currency::CurrencyCode;

/// Failures raised while fetching or reading exchange rates.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No API key configured; set FXCONV_API_KEY or api_key in the config file")]
    MissingApiKey,

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Request to rate provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Rate provider returned HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Rate provider rejected the request ({code} {kind}): {info}")]
    Rejected { code: i64, kind: String, info: String },

    #[error("Malformed response from rate provider: {0}")]
    Malformed(String),

    #[error("Currency {code} is not in the rate table for base {base}")]
    UnknownCurrency {
        code: CurrencyCode,
        base: CurrencyCode,
    },
}
