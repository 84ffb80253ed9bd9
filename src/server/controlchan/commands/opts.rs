//! The RFC 2389 Options (`OPTS`) command. Only `OPTS UTF8 ON` is meaningful here,
//! since UTF-8 command lines are accepted unconditionally.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Opts {
    option: String,
}

impl Opts {
    pub fn new(option: String) -> Self {
        Opts { option }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Opts {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        if self.option.to_ascii_uppercase().starts_with("UTF8") {
            Ok(Reply::new(ReplyCode::CommandOkay, "Always in UTF8 mode"))
        } else {
            Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Option not supported"))
        }
    }
}
