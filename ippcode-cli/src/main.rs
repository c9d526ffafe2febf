//! IPPcode23 interpreter CLI.
//!
//! Exit codes:
//! - 0: Normal completion
//! - 0-49: Status given to `EXIT`
//! - 10: Bad command-line parameters
//! - 11/12: Input file or output failures
//! - 31/32: Malformed or structurally invalid listing
//! - 52-58: Semantic and runtime errors

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use ippcode_common::ErrorKind;
use tracing_subscriber::EnvFilter;

use commands::RunConfig;

const USAGE: &str = "\
Usage: interpret [--source=FILE] [--input=FILE]
       interpret --help

Interprets an IPPcode23 program given as an XML listing.

Options:
  --source=FILE  XML listing to execute (default: standard input)
  --input=FILE   input read by READ (default: standard input)
  --help         print this message and exit

At least one of --source and --input must be given.";

#[derive(Parser, Debug)]
#[command(name = "interpret", disable_help_flag = true)]
struct Cli {
    /// Print usage and exit
    #[arg(long, conflicts_with_all = ["source", "input"])]
    help: bool,

    /// XML listing to execute
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Input file for READ
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprint!("{e}");
            usage_error();
        }
    };

    if cli.help {
        println!("{USAGE}");
        process::exit(0);
    }
    if cli.source.is_none() && cli.input.is_none() {
        eprintln!("error: at least one of --source and --input is required");
        usage_error();
    }

    let config = RunConfig {
        source: cli.source,
        input: cli.input,
    };
    match commands::run(&config) {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(e.kind().exit_code());
        }
    }
}

/// Log to stderr, filtered by `IPPCODE_LOG` (default `warn`).
fn init_logging() {
    let filter =
        EnvFilter::try_from_env("IPPCODE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn usage_error() -> ! {
    eprintln!();
    eprintln!("{USAGE}");
    process::exit(ErrorKind::Parameter.exit_code());
}
