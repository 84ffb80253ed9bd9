//! The RFC 959 No-Operation (`NOOP`) command.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Noop;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Noop {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandOkay, "Noop OK"))
    }
}
