//! The RFC 2428 Extended Passive (`EPSV`) command.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::{self, DataEndpoint};
use async_trait::async_trait;

pub struct Epsv {
    net_prt: Option<String>,
}

impl Epsv {
    pub fn new(net_prt: Option<String>) -> Self {
        Epsv { net_prt }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Epsv {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let local_ip = args.local_addr.ip();
        if let Some(net_prt) = &self.net_prt {
            let supported = match local_ip {
                std::net::IpAddr::V4(_) => net_prt == "1",
                std::net::IpAddr::V6(_) => net_prt == "2",
            };
            if !supported {
                return Ok(Reply::new(ReplyCode::NetworkProtocolNotSupported, "Network protocol not supported, use (1)"));
            }
        }
        match datachan::bind_passive(args.passive_ports.clone(), local_ip).await {
            Ok((listener, bound)) => {
                let mut session = args.session.lock().await;
                session.data_endpoint = Some(DataEndpoint::Passive(bound));
                session.passive_listener = Some(listener);
                Ok(Reply::new_with_string(
                    ReplyCode::EnteringExtendedPassiveMode,
                    format!("Entering Extended Passive Mode (|||{}|)", bound.port()),
                ))
            }
            Err(_) => Ok(Reply::new(ReplyCode::LocalError, "Could not allocate a passive port")),
        }
    }
}
