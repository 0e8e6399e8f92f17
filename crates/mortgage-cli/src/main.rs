mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::analyze::AnalyzeArgs;
use commands::batch::BatchArgs;
use commands::indicators::IndicatorsArgs;
use commands::schedule::ScheduleArgs;
use config::MortgageConfig;

/// Mortgage amortization, prepayment scenarios and appraisal indicators
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Mortgage amortization, prepayment scenarios and appraisal indicators",
    long_about = "Builds month-by-month amortization schedules for fixed-rate loans with \
                  prepayments, and appraises them with IRR, NPV, payback and total \
                  effective cost, in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Configuration file (TOML); mortgage.toml is used when present
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the amortization schedule for one scenario
    Schedule(ScheduleArgs),
    /// Schedule plus IRR, NPV, payback and CET
    Indicators(IndicatorsArgs),
    /// Full analysis: indicators, classification, prepayment summary, baseline
    Analyze(AnalyzeArgs),
    /// Analyze every scenario of a CSV sheet and export the results
    Batch(BatchArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match MortgageConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &config),
        Commands::Indicators(args) => commands::indicators::run_indicators(args, &config),
        Commands::Analyze(args) => commands::analyze::run_analyze(args, &config),
        Commands::Batch(args) => commands::batch::run_batch(args, &config),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
