//! The RFC 959 Rename From (`RNFR`) command: stashes the source path on the session
//! for a following `RNTO`.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Rnfr {
    file: String,
}

impl Rnfr {
    pub fn new(file: String) -> Self {
        Rnfr { file }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Rnfr {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let (host_path, _) = match resolver.translate(&session.cwd, &self.file) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        session.rename_from = Some(host_path);
        Ok(Reply::new(ReplyCode::FileActionPending, "Ready for RNTO"))
    }
}
