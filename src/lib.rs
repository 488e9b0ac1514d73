pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::{AppConfig, DEFAULT_PRECISION};
use crate::core::{ConversionRequest, CurrencyCode};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Commands that talk to the rate provider.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert {
        request: ConversionRequest,
        precision: Option<usize>,
        detailed: bool,
    },
    Rates {
        base: Option<CurrencyCode>,
        symbols: Vec<CurrencyCode>,
    },
    Symbols,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider =
        providers::FixerProvider::from_config(&config.fixer(), config.resolve_api_key())
            .context("Failed to initialise rate provider")?;

    match command {
        AppCommand::Convert {
            request,
            precision,
            detailed,
        } => {
            let precision = precision.or(config.precision).unwrap_or(DEFAULT_PRECISION);
            cli::convert::run(&provider, &request, precision, detailed).await
        }
        AppCommand::Rates { base, symbols } => {
            cli::rates::run(&provider, base.as_ref(), &symbols).await
        }
        AppCommand::Symbols => cli::symbols::run(&provider).await,
    }
}
