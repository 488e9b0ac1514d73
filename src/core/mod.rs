//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use convert::{ConversionRequest, ConversionResult, Converter};
pub use currency::{Amount, CurrencyCode, RateProvider, RateTable};
pub use error::ProviderError;
