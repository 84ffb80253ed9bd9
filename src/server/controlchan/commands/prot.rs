//! The RFC 2228 Data Channel Protection Level (`PROT`) command.

use crate::auth::UserDetail;
use crate::server::controlchan::command::ProtectionParam;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::ProtectionLevel;
use async_trait::async_trait;

pub struct Prot {
    param: ProtectionParam,
}

impl Prot {
    pub fn new(param: ProtectionParam) -> Self {
        Prot { param }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Prot {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        if args.session.lock().await.pbsz.is_none() {
            return Ok(Reply::new(ReplyCode::BadCommandSequence, "Send PBSZ first"));
        }
        let mut session = args.session.lock().await;
        session.protection_level = match self.param {
            ProtectionParam::Clear => ProtectionLevel::Clear,
            ProtectionParam::Private => ProtectionLevel::Private,
        };
        Ok(Reply::new(ReplyCode::CommandOkay, "PROT command successful"))
    }
}
