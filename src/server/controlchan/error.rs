//! Contains the `ControlChanError` type that defines the control channel error type.

use super::parse_error::ParseError;
use thiserror::Error;

/// The error type returned when driving a session's control channel.
#[derive(Error, Debug)]
pub enum ControlChanError {
    /// We encountered a system IO error.
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    /// Something went wrong parsing the client's command.
    #[error("failed to parse command")]
    ParseError,
    /// Internal server error. This is probably a bug, i.e. when we're unable to lock a
    /// resource we should be able to lock.
    #[error("internal server error")]
    InternalServerError,
    /// Authentication backend returned an error.
    #[error("something went wrong when trying to authenticate")]
    AuthenticationError,
    /// We received something on the data message channel that we don't understand. This
    /// should be impossible.
    #[error("failed to map event from data channel")]
    InternalMsgError,
    /// We encountered a non-UTF8 character in the command.
    #[error("non-UTF8 character in command")]
    UTF8Error,
    /// The client issued a command we don't know about.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The unrecognized command token.
        command: String,
    },
    /// The client issued a command that we know about, but in an invalid way (e.g.
    /// `USER` without a username).
    #[error("invalid command (invalid parameter)")]
    InvalidCommand,
    /// The timer on the control channel elapsed (default 300s idle timeout).
    #[error("encountered read timeout on the control channel")]
    ControlChannelTimeout,
}

/// Cheap, `Copy` discriminant of [`ControlChanError`], handy for metrics labels and
/// `match`es that don't need the associated data.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum ControlChanErrorKind {
    IOError,
    ParseError,
    InternalServerError,
    AuthenticationError,
    InternalMsgError,
    UTF8Error,
    UnknownCommand,
    InvalidCommand,
    ControlChannelTimeout,
}

impl ControlChanError {
    /// Creates a new error directly from a kind, for the cases (e.g. idle timeout) that
    /// carry no extra data.
    pub fn new(kind: ControlChanErrorKind) -> Self {
        match kind {
            ControlChanErrorKind::IOError => ControlChanError::IOError(std::io::Error::new(std::io::ErrorKind::Other, "IO error")),
            ControlChanErrorKind::ParseError => ControlChanError::ParseError,
            ControlChanErrorKind::InternalServerError => ControlChanError::InternalServerError,
            ControlChanErrorKind::AuthenticationError => ControlChanError::AuthenticationError,
            ControlChanErrorKind::InternalMsgError => ControlChanError::InternalMsgError,
            ControlChanErrorKind::UTF8Error => ControlChanError::UTF8Error,
            ControlChanErrorKind::UnknownCommand => ControlChanError::UnknownCommand { command: String::new() },
            ControlChanErrorKind::InvalidCommand => ControlChanError::InvalidCommand,
            ControlChanErrorKind::ControlChannelTimeout => ControlChanError::ControlChannelTimeout,
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ControlChanErrorKind {
        match self {
            ControlChanError::IOError(_) => ControlChanErrorKind::IOError,
            ControlChanError::ParseError => ControlChanErrorKind::ParseError,
            ControlChanError::InternalServerError => ControlChanErrorKind::InternalServerError,
            ControlChanError::AuthenticationError => ControlChanErrorKind::AuthenticationError,
            ControlChanError::InternalMsgError => ControlChanErrorKind::InternalMsgError,
            ControlChanError::UTF8Error => ControlChanErrorKind::UTF8Error,
            ControlChanError::UnknownCommand { .. } => ControlChanErrorKind::UnknownCommand,
            ControlChanError::InvalidCommand => ControlChanErrorKind::InvalidCommand,
            ControlChanError::ControlChannelTimeout => ControlChanErrorKind::ControlChannelTimeout,
        }
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(_: std::str::Utf8Error) -> ControlChanError {
        ControlChanError::UTF8Error
    }
}

impl From<ParseError> for ControlChanError {
    fn from(err: ParseError) -> ControlChanError {
        match err {
            ParseError::UnknownCommand { command } => ControlChanError::UnknownCommand { command },
            ParseError::InvalidUtf8 => ControlChanError::UTF8Error,
            ParseError::InvalidCommand | ParseError::LineTooLong => ControlChanError::InvalidCommand,
            ParseError::InvalidToken { .. } => ControlChanError::UTF8Error,
        }
    }
}
