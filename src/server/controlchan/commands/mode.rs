//! The RFC 959 Transfer Mode (`MODE`) command. Only `S` (Stream) is supported;
//! block/compressed modes are an explicit Non-goal.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Mode {
    mode: char,
}

impl Mode {
    pub fn new(mode: char) -> Self {
        Mode { mode }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Mode {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        match self.mode.to_ascii_uppercase() {
            'S' => Ok(Reply::new(ReplyCode::CommandOkay, "Mode set to Stream")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Only Stream mode is supported")),
        }
    }
}
