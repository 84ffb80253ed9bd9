//! The RFC 959 Structure Mount (`SMNT`) command: remounts the session's filesystem
//! root at an alternate path. Declined outright unless the server is configured to
//! allow it.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Smnt {
    path: String,
}

impl Smnt {
    pub fn new(path: String) -> Self {
        Smnt { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Smnt {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        if !args.allow_smnt {
            return Ok(Reply::new(ReplyCode::CommandNotImplemented, "SMNT is not allowed"));
        }
        let mut session = args.session.lock().await;
        session.cwd = self.path.clone();
        Ok(Reply::new(ReplyCode::CommandOkay, "SMNT command successful"))
    }
}
