mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analyze::{AnalyzeArgs, RankArgs};
use commands::backtest::BacktestArgs;
use commands::factors::FactorsArgs;
use commands::optimize::OptimizeArgs;
use commands::risk::{AssessArgs, RiskArgs, StressArgs};

/// Quantitative fund analysis with decimal precision
#[derive(Parser)]
#[command(
    name = "fna",
    version,
    about = "Quantitative fund analysis with decimal precision",
    long_about = "A CLI for quantitative fund analysis: factor scoring, portfolio \
                  optimization, NAV backtesting, risk assessment, stress testing, \
                  and universe ranking over historical return series."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute factor set, composite score and style for one fund
    Factors(FactorsArgs),
    /// Optimize long-only portfolio weights for a fund pool
    Optimize(OptimizeArgs),
    /// Backtest a weighted portfolio into a NAV path and summary metrics
    Backtest(BacktestArgs),
    /// Build the full risk report for an existing allocation
    Risk(RiskArgs),
    /// Assess raw risk metrics against the fixed thresholds
    Assess(AssessArgs),
    /// Run deterministic stress scenarios on a portfolio
    Stress(StressArgs),
    /// Rank a fund universe by score, Sharpe, return or drawdown control
    Rank(RankArgs),
    /// Run the full analysis pipeline (auto or manual selection)
    Analyze(AnalyzeArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Factors(args) => commands::factors::run_factors(args),
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Backtest(args) => commands::backtest::run_backtest(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Assess(args) => commands::risk::run_assess(args),
        Commands::Stress(args) => commands::risk::run_stress(args),
        Commands::Rank(args) => commands::analyze::run_rank(args),
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Version => {
            println!("fna {}", env!("CARGO_PKG_VERSION"));
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
