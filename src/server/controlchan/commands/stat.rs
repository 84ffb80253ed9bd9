//! The RFC 959 Status (`STAT`) command: with no argument, reports server status;
//! with a path, behaves like a non-data-connection `LIST`.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Stat {
    path: Option<String>,
}

impl Stat {
    pub fn new(path: Option<String>) -> Self {
        Stat { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Stat {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        match &self.path {
            None => Ok(Reply::new_multiline(
                ReplyCode::SystemStatus,
                vec![format!("Connected from {}", session.peer_addr), "End of status".to_string()],
            )),
            Some(_) => Ok(Reply::new(ReplyCode::DirectoryStatus, "Directory status not available outside a data connection")),
        }
    }
}
