//! The RFC 959 Account (`ACCT`) command. Spec §9 Non-goals scopes this to bare
//! acknowledgement — no accounting system backs it.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Acct;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Acct {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandOkay, "Account command OK"))
    }
}
