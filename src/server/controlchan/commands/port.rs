//! The RFC 959 Data Port (`PORT`) command: the client tells us where to connect for
//! active-mode transfers.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::DataEndpoint;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub struct Port {
    addr: String,
}

impl Port {
    pub fn new(addr: String) -> Self {
        Port { addr }
    }
}

fn parse_port_addr(spec: &str) -> Option<SocketAddr> {
    let parts: Vec<u16> = spec.split(',').filter_map(|p| p.parse().ok()).collect();
    if parts.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(parts[0] as u8, parts[1] as u8, parts[2] as u8, parts[3] as u8);
    let port = (parts[4] << 8) | parts[5];
    Some(SocketAddr::new(IpAddr::V4(ip), port))
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Port {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        match parse_port_addr(&self.addr) {
            Some(addr) => {
                let mut session = args.session.lock().await;
                session.data_endpoint = Some(DataEndpoint::Active(addr));
                session.passive_listener = None;
                Ok(Reply::new(ReplyCode::CommandOkay, "PORT command successful"))
            }
            None => Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Invalid PORT argument")),
        }
    }
}
