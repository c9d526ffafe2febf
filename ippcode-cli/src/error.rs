//! Errors surfaced by the `interpret` binary.

use std::io;

use ippcode_common::ErrorKind;
use ippcode_loader::LoadError;
use ippcode_vm::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A `--source` or `--input` file could not be opened or read.
    #[error("cannot read '{path}': {source}")]
    Read { path: String, source: io::Error },

    /// The listing could not be read from standard input.
    #[error("cannot read standard input: {0}")]
    Stdin(io::Error),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CliError {
    /// Failure kind, which determines the exit code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::Read { .. } | CliError::Stdin(_) => ErrorKind::Input,
            CliError::Load(e) => e.kind(),
            CliError::Runtime(e) => e.kind(),
        }
    }
}
