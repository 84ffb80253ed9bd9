//! The RFC 959 Passive (`PASV`) command: binds an ephemeral listener and reports its
//! address for the client to connect the data channel to.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::{self, DataEndpoint};
use async_trait::async_trait;

pub struct Pasv;

impl Pasv {
    pub fn new() -> Self {
        Pasv
    }
}

impl Default for Pasv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Pasv {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let local_ip = args.local_addr.ip();
        match datachan::bind_passive(args.passive_ports.clone(), local_ip).await {
            Ok((listener, bound)) => {
                let mut session = args.session.lock().await;
                let reported = std::net::SocketAddr::new(args.external_ip.unwrap_or_else(|| bound.ip()), bound.port());
                let text = ReplyCode::pasv_reply_text(reported);
                session.data_endpoint = Some(DataEndpoint::Passive(bound));
                session.passive_listener = Some(listener);
                Ok(Reply::new_with_string(ReplyCode::EnteringPassiveMode, text))
            }
            Err(_) => Ok(Reply::new(ReplyCode::LocalError, "Could not allocate a passive port")),
        }
    }
}
