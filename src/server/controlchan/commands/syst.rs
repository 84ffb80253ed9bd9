//! The RFC 959 System (`SYST`) command.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Syst;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Syst {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::SystemType, "UNIX Type: L8"))
    }
}
