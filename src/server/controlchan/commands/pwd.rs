//! The RFC 959 Print Working Directory (`PWD`) command.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Pwd;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Pwd {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        Ok(Reply::new_with_string(ReplyCode::DirCreated, format!("\"{}\" is the current directory", session.cwd)))
    }
}
