//! The `MDTM` command: reports a file's last-modified time.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct Mdtm {
    file: String,
}

impl Mdtm {
    pub fn new(file: String) -> Self {
        Mdtm { file }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Mdtm {
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
        match tokio::fs::metadata(&host_path).await.and_then(|m| m.modified()) {
            Ok(time) => {
                let dt: DateTime<Utc> = time.into();
                Ok(Reply::new_with_string(ReplyCode::FileStatus, dt.format("%Y%m%d%H%M%S").to_string()))
            }
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "File not found")),
        }
    }
}
