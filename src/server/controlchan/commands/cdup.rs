//! The RFC 959 Change to Parent Directory (`CDUP`) command.

use crate::auth::normalize_virtual;
use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Cdup;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Cdup {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let candidate = format!("{}/..", session.cwd);
        match normalize_virtual(&candidate) {
            Ok(new_cwd) => {
                session.cwd = new_cwd.clone();
                let peer_addr = session.peer_addr;
                drop(session);
                args.registry.set_cwd(peer_addr, new_cwd).await;
                Ok(Reply::new(ReplyCode::FileActionOkay, "Directory changed to parent"))
            }
            Err(_) => Ok(Reply::new(ReplyCode::FileActionOkay, "Already at root")),
        }
    }
}
