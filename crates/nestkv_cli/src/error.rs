//! Error types for the command interpreter.

use nestkv_core::CoreError;
use std::io;
use thiserror::Error;

/// Result type for interpreter operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while reading and running commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The request contained no command.
    #[error("request command is empty")]
    EmptyCommand,

    /// The command name is not recognized.
    #[error("command {name} is not supported, use HELP to list available commands")]
    UnknownCommand {
        /// The name as typed.
        name: String,
    },

    /// The command was given the wrong arguments.
    #[error("wrong arguments {got:?} for {command}, usage: {usage}")]
    WrongArguments {
        /// Canonical command name.
        command: &'static str,
        /// Expected form of the command.
        usage: &'static str,
        /// The arguments that were supplied.
        got: Vec<String>,
    },

    /// The store rejected an operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Returns `true` for malformed requests, which are reported and skipped.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyCommand | Self::UnknownCommand { .. } | Self::WrongArguments { .. }
        )
    }
}
