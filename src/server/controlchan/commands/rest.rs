//! The RFC 959 Restart (`REST`) command: sets the byte offset the next RETR/STOR
//! should resume from.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Rest {
    offset: u64,
}

impl Rest {
    pub fn new(offset: u64) -> Self {
        Rest { offset }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Rest {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.restart_offset = self.offset;
        Ok(Reply::new_with_string(ReplyCode::FileActionPending, format!("Restarting at {}.", self.offset)))
    }
}
