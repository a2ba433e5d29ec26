use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;
use xrate::cli::rates::HistoricalQuery;
use xrate::core::CurrencyCode;
use xrate::core::log::init_logging;

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
    /// Convert an amount between two currencies
    Convert {
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    /// Display latest or historical rates for a base currency
    Rates {
        base: CurrencyCode,
        /// First day of a historical range (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of a historical range, defaults to today
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        #[arg(long, default_value_t = 1, requires = "start")]
        page: usize,
        #[arg(long, default_value_t = 10, requires = "start")]
        page_size: usize,
    },
    /// Check whether currencies are supported
    Check {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => xrate::AppCommand::Convert {
                amount,
                from: from.into(),
                to: to.into(),
            },
            Commands::Rates {
                base,
                start,
                end,
                page,
                page_size,
            } => xrate::AppCommand::Rates {
                base: base.into(),
                historical: start.map(|start| HistoricalQuery {
                    start,
                    end: end.unwrap_or_else(|| Utc::now().date_naive()),
                    page,
                    page_size,
                }),
            },
            Commands::Check { codes } => xrate::AppCommand::Check { codes },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup().map(|path| {
            println!("Created configuration at {}", path.display());
        }),
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

    #[test]
    fn test_paging_requires_start_date() {
        assert!(Cli::try_parse_from(["xrate", "rates", "EUR", "--page", "3"]).is_err());
        assert!(Cli::try_parse_from(["xrate", "rates", "EUR", "--page-size", "5"]).is_err());
        assert!(Cli::try_parse_from(["xrate", "rates", "EUR"]).is_ok());

        let cli = Cli::try_parse_from([
            "xrate",
            "rates",
            "eur",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--page",
            "3",
        ])
        .unwrap();
        match cli.command.map(xrate::AppCommand::from) {
            Some(xrate::AppCommand::Rates { base, historical }) => {
                assert_eq!(base, "EUR");
                let query = historical.unwrap();
                assert_eq!(query.page, 3);
                assert_eq!(query.page_size, 10);
            }
            _ => panic!("Expected a rates command"),
        }
    }

    #[test]
    fn test_currency_arguments_are_three_letters() {
        assert!(Cli::try_parse_from(["xrate", "convert", "10", "EURO", "USD"]).is_err());
        assert!(Cli::try_parse_from(["xrate", "convert", "10", "eur", "usd"]).is_ok());
    }
}
