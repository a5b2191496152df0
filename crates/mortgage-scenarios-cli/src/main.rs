mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::scenarios::{LoanDetailsArgs, ScenariosArgs};
use commands::schedule::ScheduleArgs;

/// Explore mortgage financing scenarios
#[derive(Parser)]
#[command(
    name = "msc",
    version,
    about = "Explore mortgage financing scenarios",
    long_about = "A CLI for searching discount-point and down-payment combinations \
                  that fit a buyer's cash, debt-to-income and monthly budget limits, \
                  with decimal precision. Supports ranking, amortization schedules \
                  and milestone comparisons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate feasible points / down payment scenarios
    Scenarios(ScenariosArgs),
    /// Build an amortization schedule for a single loan
    Schedule(ScheduleArgs),
    /// Scenario search with balance and interest milestones
    LoanDetails(LoanDetailsArgs),
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

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MSC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries the command result
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::LoanDetails(args) => commands::scenarios::run_loan_details(args),
        Commands::Version => {
            println!("msc {}", env!("CARGO_PKG_VERSION"));
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
