//! # Bodega Rates CLI
//!
//! Operator tool for inspecting and maintaining the cached exchange rate.
//!
//! ## Usage
//! ```bash
//! # Show the cached rate
//! cargo run -p bodega-rates -- show
//!
//! # Fetch a fresh rate from the provider
//! cargo run -p bodega-rates -- refresh
//!
//! # Override the rate by hand (comma or period decimals)
//! cargo run -p bodega-rates -- set 36,52
//!
//! # Convert 25 USD to VES, or 1000 VES to USD
//! cargo run -p bodega-rates -- convert 25
//! cargo run -p bodega-rates -- convert 1000 --to-foreign
//!
//! # Sale price for a product costing 4.00 with 30% markup
//! cargo run -p bodega-rates -- price 4 30
//!
//! # Use a specific config file
//! cargo run -p bodega-rates -- --config ./bodega.toml show
//! ```

use bodega_core::validation::parse_decimal_input;
use bodega_core::{ConversionDirection, CoreError, Currency, ProductPricing, SaleUnit};
use bodega_rates::{open_store, HttpRateFetcher, RateError, RateResult, RateService, RatesConfig};
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum Command {
    Show,
    Refresh,
    Set(String),
    Convert { amount: String, to_foreign: bool },
    Price { cost: String, profit: String },
}

fn print_help() {
    println!("Bodega Exchange Rate Tool");
    println!();
    println!("Usage: bodega-rates [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  show                         Show the cached rate");
    println!("  refresh                      Fetch a fresh rate from the provider");
    println!("  set <RATE>                   Set the rate manually");
    println!("  convert <AMOUNT> [--to-foreign]");
    println!("                               Convert USD to VES (or VES to USD)");
    println!("  price <COST> <PROFIT>        Sale price for a cost and markup");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>   Config file (default: platform config dir)");
    println!("  -h, --help            Show this help message");
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bodega=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses arguments. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<(Option<PathBuf>, Command)>, String> {
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut to_foreign = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| "--config needs a path".to_string())?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--to-foreign" => to_foreign = true,
            "--help" | "-h" => return Ok(None),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("show") => Command::Show,
        Some("refresh") => Command::Refresh,
        Some("set") => Command::Set(
            positional
                .next()
                .ok_or_else(|| "set needs a rate".to_string())?,
        ),
        Some("convert") => Command::Convert {
            amount: positional
                .next()
                .ok_or_else(|| "convert needs an amount".to_string())?,
            to_foreign,
        },
        Some("price") => {
            let cost = positional
                .next()
                .ok_or_else(|| "price needs a cost".to_string())?;
            let profit = positional
                .next()
                .ok_or_else(|| "price needs a profit setting".to_string())?;
            Command::Price { cost, profit }
        }
        Some(other) => return Err(format!("unknown command: {}", other)),
        None => return Ok(None),
    };

    Ok(Some((config_path, command)))
}

async fn run(config: RatesConfig, command: Command) -> RateResult<()> {
    let store = open_store(&config.store).await?;
    let fetcher = Arc::new(HttpRateFetcher::new(config.provider.clone())?);
    let rates = RateService::new(store, fetcher);

    match command {
        Command::Show => {
            let rate = rates.current().await;
            if !rate.is_known() {
                println!("No exchange rate yet. Run `bodega-rates refresh` or `set <RATE>`.");
                return Ok(());
            }

            println!(
                "1 USD = {}",
                Currency::Local.format_with_symbol(Some(rate.rate))
            );
            println!("Source:   {}", rate.source);
            println!("Captured: {}", rate.captured_at.to_rfc3339());
            if rate.is_stale(Utc::now(), config.display.stale_after()) {
                println!(
                    "⚠ Older than {} hours, consider refreshing",
                    config.display.stale_after_hours
                );
            }
        }
        Command::Refresh => {
            let rate = rates.refresh().await?;
            println!(
                "✓ 1 USD = {} ({})",
                Currency::Local.format_with_symbol(Some(rate.rate)),
                rate.source
            );
        }
        Command::Set(input) => {
            let rate = rates.parse_manual(&input).await?;
            println!(
                "✓ 1 USD = {} (manual)",
                Currency::Local.format_with_symbol(Some(rate.rate))
            );
        }
        Command::Convert { amount, to_foreign } => {
            let amount = parse_decimal_input("amount", &amount)?;
            let direction = if to_foreign {
                ConversionDirection::LocalToForeign
            } else {
                ConversionDirection::ForeignToLocal
            };

            if !rates.current().await.is_known() {
                println!("{}", CoreError::ConversionUnavailable);
                return Ok(());
            }

            let result = rates.quote(amount, direction).await;
            println!(
                "{} = {}",
                direction.input_currency().format_with_symbol(Some(amount)),
                direction.output_currency().format_with_symbol(result)
            );
        }
        Command::Price { cost, profit } => {
            let cost = parse_decimal_input("cost", &cost)?;
            let profit = parse_decimal_input("profit", &profit)?;
            let pricing = ProductPricing::try_new(cost, profit, SaleUnit::Unit)?;

            let rate = rates.current().await;
            let prices = pricing.sale_prices(rate.rate);

            println!(
                "Markup:     {:.2}%",
                pricing.profit().as_percentage()
            );
            println!(
                "Sale price: {}",
                Currency::Foreign.format_with_symbol(Some(prices.foreign))
            );
            println!(
                "Margin:     {}",
                Currency::Foreign.format_with_symbol(Some(pricing.margin_foreign()))
            );
            match prices.local {
                Some(local) => println!(
                    "In VES:     {}",
                    Currency::Local.format_with_symbol(Some(local))
                ),
                None => println!("In VES:     {}", CoreError::ConversionUnavailable),
            }
        }
    }

    Ok(())
}

fn report(err: &RateError) {
    if err.is_user_visible() {
        eprintln!("✗ {}", err);
    } else {
        error!(code = err.code(), error = %err, "Command failed");
        eprintln!("✗ Something went wrong ({})", err.code());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let (config_path, command) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("✗ {}", message);
            eprintln!();
            print_help();
            return ExitCode::from(2);
        }
    };

    init_tracing();

    let config = match RatesConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    match run(config, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        let (path, command) = parse_args(&args(&["--config", "b.toml", "set", "36,5"]))
            .unwrap()
            .unwrap();
        assert_eq!(path, Some(PathBuf::from("b.toml")));
        assert!(matches!(command, Command::Set(ref r) if r == "36,5"));

        let (_, command) = parse_args(&args(&["convert", "1000", "--to-foreign"]))
            .unwrap()
            .unwrap();
        assert!(matches!(
            command,
            Command::Convert { ref amount, to_foreign: true } if amount == "1000"
        ));
    }

    #[test]
    fn test_parse_help_and_errors() {
        assert!(parse_args(&args(&[])).unwrap().is_none());
        assert!(parse_args(&args(&["show", "--help"])).unwrap().is_none());
        assert!(parse_args(&args(&["price", "4"])).is_err());
        assert!(parse_args(&args(&["launch"])).is_err());
        assert!(parse_args(&args(&["show", "--config"])).is_err());
    }
}
