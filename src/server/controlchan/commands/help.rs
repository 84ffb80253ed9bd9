//! The RFC 959 Help (`HELP`) command. Exempt from the login-required gate.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Help;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Help {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::HelpMessage, "Contact the server administrator for help"))
    }
}
