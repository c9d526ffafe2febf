//! The run command: read the listing, load it, execute it.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use ippcode_vm::{Io, Outcome};
use tracing::debug;

use crate::error::CliError;

/// Where the listing and the READ input come from. `None` means standard input.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub source: Option<PathBuf>,
    pub input: Option<PathBuf>,
}

/// Load and execute the configured program.
///
/// Standard output is flushed before this returns, on success and on
/// failure alike.
pub fn run(config: &RunConfig) -> Result<Outcome, CliError> {
    debug!(source = ?config.source, input = ?config.input, "run");

    let listing = match &config.source {
        Some(path) => fs::read(path).map_err(|e| read_error(path, e))?,
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(CliError::Stdin)?;
            bytes
        }
    };

    let input: Box<dyn BufRead> = match &config.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|e| read_error(path, e))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let program = ippcode_loader::load_bytes(&listing)?;

    let io = Io::new(input, BufWriter::new(io::stdout().lock()), io::stderr());
    let outcome = ippcode_vm::run(&program, io)?;
    Ok(outcome)
}

fn read_error(path: &Path, source: io::Error) -> CliError {
    CliError::Read {
        path: path.display().to_string(),
        source,
    }
}
