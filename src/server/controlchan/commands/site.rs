//! The RFC 959 `SITE` command: server-specific extension commands. No `SITE`
//! subcommands are implemented; this just acknowledges the verb.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Site {
    #[allow(dead_code)]
    args: String,
}

impl Site {
    pub fn new(args: String) -> Self {
        Site { args }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Site {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "No SITE subcommands are supported"))
    }
}
