// rowmatch CLI - reconcile two tabular sources described by a job file

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rowmatch")]
#[command(about = "Reconcile two tabular sources on mapped key fields")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a comparison from a TOML job file
    #[command(after_help = "\
Examples:
  rowmatch run customers.toml
  rowmatch run customers.toml --json | jq .stats
  rowmatch run customers.toml --output result.json
  rowmatch run customers.toml --export-dir out/

Exit codes: 0 reconciled, 1 discrepancies, 3 invalid job, 4 runtime failure")]
    Run {
        /// Path to the job file
        job: PathBuf,

        /// Print the JSON result to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write missing_in_a.csv, missing_in_b.csv, duplicates_a.csv and
        /// duplicates_b.csv to this directory
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },

    /// Validate a job file without running it
    #[command(after_help = "\
Examples:
  rowmatch validate customers.toml")]
    Validate {
        /// Path to the job file
        job: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };
    logging::init();

    let result = match cli.command {
        Commands::Run { job, json, output, export_dir } => {
            recon::cmd_run(job, json, output, export_dir)
        }
        Commands::Validate { job } => recon::cmd_validate(job),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
