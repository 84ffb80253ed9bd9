//! Reply formatting, command parsing, and the command dispatch table.

pub mod codec;
pub mod command;
pub mod commands;
pub mod error;
pub mod handler;
pub mod parse_error;
pub mod reply;

pub use codec::FTPCodec;
pub use command::Command;
pub use error::{ControlChanError, ControlChanErrorKind};
pub use reply::{Reply, ReplyCode};
