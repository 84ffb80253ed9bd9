//! The RFC 3659 Machine List (`MLST`) command: reports facts about a single entry
//! directly in the control channel reply, with no data connection.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::listing;
use async_trait::async_trait;

pub struct Mlst {
    path: Option<String>,
}

impl Mlst {
    pub fn new(path: Option<String>) -> Self {
        Mlst { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Mlst {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let target = self.path.as_deref().unwrap_or(".");
        let (host_path, virtual_path) = match resolver.translate(&session.cwd, target) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        let parent = host_path.parent().unwrap_or(&host_path);
        let entries = match listing::read_dir(parent).await {
            Ok(e) => e,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Not found")),
        };
        let name = host_path.file_name().map(|n| n.to_string_lossy().to_string());
        let matching: Vec<_> = entries.into_iter().filter(|e| Some(&e.name) == name.as_ref()).collect();
        if matching.is_empty() {
            return Ok(Reply::new(ReplyCode::FileError, "Not found"));
        }
        Ok(Reply::new_multiline(
            ReplyCode::DirectoryStatus,
            vec![format!("Listing {}", virtual_path), listing::format_mlsx(&matching).trim_end().to_string(), "End".to_string()],
        ))
    }
}
