use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::AppCommand;
use fxconv::core::config::load_dotenv;
use fxconv::core::log::init_logging;
use fxconv::core::{Amount, ConversionRequest, CurrencyCode};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount from one currency to another
    #[command(allow_negative_numbers = true)]
    Convert {
        /// Amount to convert, e.g. 100 or 12.50
        amount: Amount,
        /// Currency to convert from, e.g. USD
        from: CurrencyCode,
        /// Currency to convert to, e.g. EUR
        to: CurrencyCode,
        /// Decimal places in the output
        #[arg(short, long)]
        precision: Option<usize>,
        /// Also print the applied rate and its date
        #[arg(short, long)]
        detailed: bool,
    },
    /// Display the latest exchange rates
    Rates {
        /// Base currency; the provider default is used when omitted
        #[arg(short, long)]
        base: Option<CurrencyCode>,
        /// Comma separated currencies to limit the output to
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<CurrencyCode>,
    },
    /// List supported currencies
    Symbols,
}

impl Commands {
    fn into_app_command(self) -> Option<AppCommand> {
        match self {
            Commands::Setup => None,
            Commands::Convert {
                amount,
                from,
                to,
                precision,
                detailed,
            } => Some(AppCommand::Convert {
                request: ConversionRequest::new(amount, from, to),
                precision,
                detailed,
            }),
            Commands::Rates { base, symbols } => Some(AppCommand::Rates { base, symbols }),
            Commands::Symbols => Some(AppCommand::Symbols),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    load_dotenv();

    let result = match cli.command.map(Commands::into_app_command) {
        Some(Some(cmd)) => fxconv::run_command(cmd, cli.config_path.as_deref()).await,
        Some(None) => fxconv::cli::setup::setup(),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("fxconv").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_command() {
        let cli = parse(&["convert", "100", "usd", "EUR", "-p", "3"]).unwrap();
        match cli.command.and_then(Commands::into_app_command) {
            Some(AppCommand::Convert {
                request,
                precision,
                detailed,
            }) => {
                assert_eq!(request.amount.value(), 100.0);
                assert_eq!(request.from.as_str(), "USD");
                assert_eq!(request.to.as_str(), "EUR");
                assert_eq!(precision, Some(3));
                assert!(!detailed);
            }
            _ => panic!("Expected convert command"),
        }
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let err = parse(&["convert", "abc", "USD", "EUR"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("is not a number"));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let err = parse(&["convert", "-5", "USD", "EUR"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_malformed_currency_is_rejected() {
        let err = parse(&["convert", "5", "DOLLARS", "EUR"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_missing_arguments_are_rejected() {
        let err = parse(&["convert", "5", "USD"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_rates_symbols_list() {
        let cli = parse(&["rates", "--base", "gbp", "--symbols", "usd,eur"]).unwrap();
        match cli.command {
            Some(Commands::Rates { base, symbols }) => {
                assert_eq!(base.unwrap().as_str(), "GBP");
                let symbols: Vec<&str> = symbols.iter().map(CurrencyCode::as_str).collect();
                assert_eq!(symbols, vec!["USD", "EUR"]);
            }
            _ => panic!("Expected rates command"),
        }
    }
}
