//! The `CommandHandler` trait: one implementation per FTP verb, living under
//! `controlchan::commands` as one file each. Storage is always the host filesystem, so
//! handlers carry no storage-backend generic, only the authenticated user type.

use super::super::chancomms::ControlMsgSender;
use super::command::Command;
use super::error::ControlChanError;
use super::reply::Reply;
use crate::auth::{Authenticator, UserDetail};
use crate::server::session::SharedSession;
use crate::server::session_registry::SessionRegistry;
use async_trait::async_trait;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command handler needs to do its job.
pub struct CommandContext<U: UserDetail> {
    pub cmd: Command,
    pub session: SharedSession<U>,
    pub authenticator: Arc<dyn Authenticator<U>>,
    pub tls_configured: bool,
    pub passive_ports: Range<u16>,
    pub tx: ControlMsgSender,
    pub local_addr: std::net::SocketAddr,
    pub registry: SessionRegistry,
    pub allow_smnt: bool,
    pub external_ip: Option<std::net::IpAddr>,
    /// Data-channel TLS material (`PROT P`); `None` unless `AUTH TLS` is configured.
    pub certs_file: Option<PathBuf>,
    pub certs_password: Option<String>,
}

/// One async handler per FTP verb. Implementors live under `controlchan::commands`.
#[async_trait]
pub trait CommandHandler<U: UserDetail>: Sync + Send {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError>;
}
