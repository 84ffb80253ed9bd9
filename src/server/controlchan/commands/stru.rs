//! The RFC 959 File Structure (`STRU`) command. Only `F` (File structure) is
//! supported; record/page structures are an explicit Non-goal.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Stru {
    structure: char,
}

impl Stru {
    pub fn new(structure: char) -> Self {
        Stru { structure }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Stru {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        match self.structure.to_ascii_uppercase() {
            'F' => Ok(Reply::new(ReplyCode::CommandOkay, "File structure OK")),
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Only File structure is supported")),
        }
    }
}
