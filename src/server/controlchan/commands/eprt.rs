//! The RFC 2428 Extended Data Port (`EPRT`) command: `|proto|addr|port|`.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::DataEndpoint;
use async_trait::async_trait;
use std::net::SocketAddr;

pub struct Eprt {
    addr: String,
}

impl Eprt {
    pub fn new(addr: String) -> Self {
        Eprt { addr }
    }
}

fn parse_eprt(spec: &str) -> Option<SocketAddr> {
    let trimmed = spec.trim_matches('|');
    let mut parts = spec.trim_start_matches('|').trim_end_matches('|').split('|');
    let _proto = parts.next()?;
    let addr = parts.next()?;
    let port = parts.next()?;
    if trimmed.is_empty() {
        return None;
    }
    let ip: std::net::IpAddr = addr.parse().ok()?;
    let port: u16 = port.parse().ok()?;
    Some(SocketAddr::new(ip, port))
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Eprt {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        match parse_eprt(&self.addr) {
            Some(addr) => {
                let mut session = args.session.lock().await;
                session.data_endpoint = Some(DataEndpoint::Active(addr));
                session.passive_listener = None;
                Ok(Reply::new(ReplyCode::CommandOkay, "EPRT command successful"))
            }
            None => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid EPRT argument")),
        }
    }
}
