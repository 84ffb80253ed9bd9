//! The RFC 959 Representation Type (`TYPE`) command
//
// The default representation type is ASCII Non-print. ASCII/EBCDIC translation modes
// are an explicit Non-goal, so this handler only distinguishes Image (binary) from
// everything else for bookkeeping purposes; transfers are always treated as binary.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::CommandContext;
use crate::server::controlchan::handler::CommandHandler;
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::TransferType;
use async_trait::async_trait;

pub struct Type;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Type {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.transfer_type = TransferType::Binary;
        Ok(Reply::new(ReplyCode::CommandOkay, "Always in binary mode"))
    }
}
