use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::Amount;
use tracing::{debug, error};

use tax_cli::app::{self, FileOutcome, LoadedReturn};
use tax_cli::config::{AppConfig, Overrides};
use tax_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Municipal income tax return calculator.
///
/// Loads a return document (TOML) and optional W-2 wage details (CSV),
/// then computes, checks or files the return.
#[derive(Debug, Parser)]
#[command(name = "municipal-tax", version)]
struct Cli {
    /// TOML config file with logging and tax settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tax rate as a fraction, e.g. `0.02` for 2%.
    #[arg(long, global = true)]
    tax_rate: Option<Decimal>,

    /// Balances due at or below this amount are not collected.
    #[arg(long, global = true)]
    threshold: Option<Amount>,

    /// Log level or EnvFilter directive. `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ReturnArgs {
    /// Return document (TOML, camelCase form field names).
    #[arg(long = "return", value_name = "FILE")]
    return_file: PathBuf,

    /// W-2 wage details (CSV).
    #[arg(long, value_name = "CSV")]
    wages: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print wage totals and the tax calculation.
    Compute(ReturnArgs),

    /// Validate every section of the return.
    Check(ReturnArgs),

    /// Walk the form section by section and file the completed return.
    File {
        #[command(flatten)]
        input: ReturnArgs,

        /// Where to write the finalized return (TOML).
        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Replace the output file if it exists.
        #[arg(long)]
        force: bool,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(Overrides {
        tax_rate: cli.tax_rate,
        threshold: cli.threshold,
        log_level: cli.log_level,
        log_file: cli.log_file,
    })?;
    logging::init_logging(&config.log_level, config.log_file.as_deref())?;
    debug!("using {} tax rules", config.tax.municipality);

    let mut out = io::stdout().lock();

    match cli.command {
        Command::Compute(args) => {
            let input = LoadedReturn::load(&args.return_file, args.wages.as_deref())?;
            app::compute(&config, &input, &mut out)?;
        }
        Command::Check(args) => {
            let input = LoadedReturn::load(&args.return_file, args.wages.as_deref())?;
            if !app::check(&input, &mut out)?.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::File {
            input,
            output,
            force,
        } => {
            let loaded = LoadedReturn::load(&input.return_file, input.wages.as_deref())?;
            if let FileOutcome::Blocked { section, errors } =
                app::file(&config, loaded, output, force, &mut out)?
            {
                error!("Cannot file: '{}' has {} invalid field(s)", section, errors.len());
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
