mod classify;
mod error;
mod extract;
mod input;
mod normalize;
mod replay;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "dispute-agents")]
#[command(about = "Inspect recorded fraud-dispute agent calls")]
struct Cli {
    /// TOML file overriding agent endpoint IDs.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the normalized payload of every call in a JSONL log.
    Normalize(normalize::Args),
    /// Upgrade every call to the result shape of one agent.
    Classify(classify::Args),
    /// Print the first present string field of every call.
    Extract(extract::Args),
    /// Replay an intake conversation against recorded case-manager calls.
    Replay(replay::Args),
}

/// Outcome of a command that reads a call log.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Summary {
    pub(crate) calls: usize,
    pub(crate) failed_lines: usize,
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Summary, CliError> {
    let directory = input::load_directory(cli.config.as_deref())?;
    match cli.command {
        Command::Normalize(args) => normalize::run(args),
        Command::Classify(args) => classify::run(args),
        Command::Extract(args) => extract::run(args),
        Command::Replay(args) => replay::run(args, directory),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(summary) if summary.failed_lines == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!(
                "{} of {} lines could not be ingested",
                summary.failed_lines,
                summary.calls + summary.failed_lines
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
