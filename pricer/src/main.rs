mod commands;
mod config;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use pricing::{
    BlackScholesMerton, BoundaryContext, FailurePolicy, Greek, GreekConvention, OptionRecord,
    OptionType,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::ProfileRequest;
use crate::config::PricerConfig;

#[derive(Debug, Parser)]
#[command(name = "pricer", version, about = "Black-Scholes-Merton option prices and Greeks")]
struct Cli {
    /// TOML file with a [pricing] table (risk_free_rate, dividend_yield, convention)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Day from which maturity dates are measured, defaults to today
    #[arg(long, global = true)]
    valuation_date: Option<NaiveDate>,

    /// Overrides the configured gamma / theta convention
    #[arg(long, global = true, value_enum)]
    convention: Option<ConventionArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConventionArg {
    Textbook,
    Multiplicative,
}

impl From<ConventionArg> for GreekConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Textbook => GreekConvention::Textbook,
            ConventionArg::Multiplicative => GreekConvention::Multiplicative,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnError {
    Skip,
    ZeroFill,
}

impl From<OnError> for FailurePolicy {
    fn from(arg: OnError) -> Self {
        match arg {
            OnError::Skip => FailurePolicy::Skip,
            OnError::ZeroFill => FailurePolicy::ZeroFill,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Price a single option
    Quote {
        #[arg(long = "type")]
        option_type: String,
        #[arg(long)]
        strike: String,
        #[arg(long)]
        spot: String,
        /// YYYY-MM-DD, DD/MM/YYYY or a year fraction
        #[arg(long)]
        maturity: String,
        #[arg(long)]
        volatility: String,
        /// risk-free rate in percent
        #[arg(long)]
        rate: Option<String>,
        /// dividend yield in percent
        #[arg(long)]
        dividend: Option<String>,
    },
    /// Price every option record of a CSV file
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// defaults to stdout
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "skip")]
        on_error: OnError,
    },
    /// Print a price or Greek over a ladder of spots as CSV, one column per strike
    Profile {
        #[arg(long = "type")]
        option_type: OptionType,
        /// repeat for several strikes
        #[arg(long = "strike", required = true)]
        strikes: Vec<f64>,
        #[arg(long)]
        maturity_years: f64,
        #[arg(long)]
        volatility: f64,
        #[arg(long, default_value = "price")]
        greek: Greek,
        #[arg(long, default_value_t = 1.0)]
        from: f64,
        #[arg(long, default_value_t = 150.0)]
        to: f64,
        #[arg(long, default_value_t = 1.0)]
        step: f64,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut defaults = PricerConfig::load(cli.config.as_deref())?.pricing;
    if let Some(convention) = cli.convention {
        defaults.convention = convention.into();
    }
    let valuation_date = cli
        .valuation_date
        .unwrap_or_else(|| Local::now().date_naive());
    debug!(?defaults, %valuation_date, "configuration loaded");

    let engine = BlackScholesMerton::from_defaults(&defaults);
    let ctx = BoundaryContext::new(defaults, valuation_date);

    match cli.command {
        Command::Quote {
            option_type,
            strike,
            spot,
            maturity,
            volatility,
            rate,
            dividend,
        } => {
            let record = OptionRecord {
                ticker: String::new(),
                strike,
                spot,
                maturity,
                volatility,
                option_type,
                risk_free_rate: rate,
                dividend_yield: dividend,
            };
            let greeks = commands::quote(&engine, &record, &ctx)?;
            commands::write_quote(io::stdout().lock(), &greeks)
        }
        Command::Batch {
            input,
            output,
            on_error,
        } => commands::batch(&engine, &ctx, &input, output.as_deref(), on_error.into()),
        Command::Profile {
            option_type,
            strikes,
            maturity_years,
            volatility,
            greek,
            from,
            to,
            step,
        } => {
            let request = ProfileRequest {
                option_type,
                strikes,
                maturity_years,
                volatility,
                greek,
                from,
                to,
                step,
            };
            commands::profile(&engine, &ctx, &request, io::stdout().lock())
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    run(Cli::parse())
}
