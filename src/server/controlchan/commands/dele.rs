//! The RFC 959 Delete (`DELE`) command.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Dele {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        if !user.write_allowed() {
            return Ok(Reply::new(ReplyCode::FileError, "Write access denied"));
        }
        let resolver = PathResolver::new(user.root().clone());
        let (host_path, _) = match resolver.translate(&session.cwd, &self.path) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        match tokio::fs::remove_file(&host_path).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "File successfully removed")),
            Err(_) => Ok(Reply::new(ReplyCode::TransientFileError, "Failed to delete the file")),
        }
    }
}
