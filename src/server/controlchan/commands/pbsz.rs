//! The RFC 2228 Protection Buffer Size (`PBSZ`) command. Buffer size is meaningless
//! for the TLS data channel but the handshake requires sending it (always 0).

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Pbsz;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Pbsz {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.pbsz = Some(0);
        Ok(Reply::new(ReplyCode::CommandOkay, "PBSZ=0"))
    }
}
