//! The RFC 2228/4217 `AUTH TLS` command: requests the control channel upgrade to TLS.

use crate::auth::UserDetail;
use crate::server::chancomms::InternalMsg;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;
use futures::SinkExt;

pub struct Auth {
    protocol: String,
}

impl Auth {
    pub fn new(protocol: String) -> Self {
        Auth { protocol }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Auth {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        if !args.tls_configured {
            return Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "TLS is not configured"));
        }
        if self.protocol != "TLS" && self.protocol != "SSL" {
            return Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Only AUTH TLS is supported"));
        }
        let mut tx = args.tx.clone();
        let _ = tx.send(InternalMsg::SecureControlChannel).await;
        Ok(Reply::new(ReplyCode::AuthOkayNoDataNeeded, "AUTH command OK, starting TLS handshake"))
    }
}
