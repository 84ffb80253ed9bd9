//! The `SIZE` command: reports a file's byte length.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Size {
    file: String,
}

impl Size {
    pub fn new(file: String) -> Self {
        Size { file }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Size {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let (host_path, _) = match resolver.translate(&session.cwd, &self.file) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        match tokio::fs::metadata(&host_path).await {
            Ok(meta) => Ok(Reply::new_with_string(ReplyCode::FileStatus, meta.len().to_string())),
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "File not found")),
        }
    }
}
