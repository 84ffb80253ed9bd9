//! The RFC 959 List (`LIST`) command: sends a Unix `ls -l`-style directory listing
//! over the data connection.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::datachan::DataTlsConfig;
use crate::server::{datachan, listing};
use async_trait::async_trait;

pub struct List {
    path: Option<String>,
}

impl List {
    pub fn new(path: Option<String>) -> Self {
        List { path }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for List {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let target = self.path.as_deref().unwrap_or(".");
        let (host_path, _) = match resolver.translate(&session.cwd, target) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        let entries = match listing::read_dir(&host_path).await {
            Ok(e) => e,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Directory not found")),
        };
        let endpoint = match session.data_endpoint.clone() {
            Some(e) => e,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Send PORT or PASV first")),
        };
        let listener = session.passive_listener.take();
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

        tokio::spawn(datachan::send_listing(endpoint, listener, listing::format_list(&entries), tx, abort_rx, protection, tls_config));

        Ok(Reply::new(ReplyCode::FileStatusOkay, "Here comes the directory listing"))
    }
}
