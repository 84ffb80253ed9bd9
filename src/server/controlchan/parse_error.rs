//! Errors produced while parsing a raw command line into a [`Command`](super::command::Command).

use thiserror::Error;

/// What went wrong turning a line of input into a [`Command`](super::command::Command).
#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum ParseError {
    /// The command token isn't one we recognize.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The offending token, uppercased.
        command: String,
    },
    /// The line contained a byte sequence that isn't valid UTF-8.
    #[error("invalid UTF-8 in command line")]
    InvalidUtf8,
    /// The command is recognized but its argument is missing or malformed.
    #[error("invalid command")]
    InvalidCommand,
    /// A specific argument token couldn't be parsed into the type the command expects.
    #[error("invalid token: {token}")]
    InvalidToken {
        /// The token that failed to parse.
        token: String,
    },
    /// The line exceeded the 4096 byte limit from spec.
    #[error("command line too long")]
    LineTooLong,
}
