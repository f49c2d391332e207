mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::irr::IrrArgs;
use commands::offer::EvaluateArgs;
use commands::session::{CompareArgs, SensitivityArgs, ValidateArgs};

/// Compare fees and net returns across investment offers
#[derive(Parser)]
#[command(
    name = "feecalc",
    version,
    about = "Compare fees and net returns across investment offers",
    long_about = "A CLI for comparing what competing investment offers actually return \
                  after management fees, carried interest with hurdle and catch-up, and \
                  one-time fees. Computes MOIC, IRR, break-even price and exit-price \
                  sensitivity with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and analysis diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one offer against one scenario
    Evaluate(EvaluateArgs),
    /// Evaluate, sweep and compare every offer in a session
    Compare(CompareArgs),
    /// Net outcomes across a range of exit prices
    Sensitivity(SensitivityArgs),
    /// Internal rate of return of a cash-flow series
    Irr(IrrArgs),
    /// Report validation issues in a session document
    Validate(ValidateArgs),
    /// Print a starter session document
    Init,
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
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // stdout carries the result document
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::offer::run_evaluate(args),
        Commands::Compare(args) => commands::session::run_compare(args),
        Commands::Sensitivity(args) => commands::session::run_sensitivity(args),
        Commands::Irr(args) => commands::irr::run_irr(args),
        Commands::Validate(args) => commands::session::run_validate(args),
        Commands::Init => commands::session::run_init(),
        Commands::Version => {
            println!("feecalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
