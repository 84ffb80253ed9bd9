//! The RFC 959 Append (`APPE`) command: like `STOR` but appends to an existing file
//! instead of truncating it.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::{self, DataTlsConfig};
use async_trait::async_trait;

pub struct Appe {
    path: String,
}

impl Appe {
    pub fn new(path: String) -> Self {
        Appe { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Appe {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        if !user.write_allowed() {
            return Ok(Reply::new(ReplyCode::FileError, "Write access denied"));
        }
        let resolver = PathResolver::new(user.root().clone());
        let (host_path, _) = match resolver.translate(&session.cwd, &self.path) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        let endpoint = match session.data_endpoint.clone() {
            Some(e) => e,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Send PORT or PASV first")),
        };
        let listener = session.passive_listener.take();
        session.restart_offset = 0;
        let tx = match &session.control_msg_tx {
            Some(tx) => tx.clone(),
            None => return Err(ControlChanError::InternalServerError),
        };
        let (abort_tx, abort_rx) = futures::channel::mpsc::channel(1);
        session.data_abort_tx = Some(abort_tx);
        let protection = session.protection_level;
        let tls_config = DataTlsConfig {
            identity_file: args.certs_file.clone(),
            identity_password: args.certs_password.clone(),
        };

        tokio::spawn(datachan::recv_file(endpoint, listener, host_path, true, tx, abort_rx, protection, tls_config));

        Ok(Reply::new(ReplyCode::FileStatusOkay, "Opening data connection for append"))
    }
}
