//! The RFC 959 Change Working Directory (`CWD`) command.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Cwd {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let (host_path, virtual_path) = match resolver.translate(&session.cwd, &self.path) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        match resolver.canonicalize_within_root(&host_path).await {
            Ok(canonical) if canonical.is_dir() => {
                session.cwd = virtual_path.clone();
                let peer_addr = session.peer_addr;
                drop(session);
                args.registry.set_cwd(peer_addr, virtual_path).await;
                Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully changed directory"))
            }
            Ok(_) => Ok(Reply::new(ReplyCode::FileError, "Not a directory")),
            Err(_) => Ok(Reply::new(ReplyCode::FileError, "Directory not found")),
        }
    }
}
