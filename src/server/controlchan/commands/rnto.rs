//! The RFC 959 Rename To (`RNTO`) command: completes a rename started by `RNFR`.

use crate::auth::{PathResolver, UserDetail};
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Rnto {
    file: String,
}

impl Rnto {
    pub fn new(file: String) -> Self {
        Rnto { file }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Rnto {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match &session.user {
            Some(u) => u,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate")),
        };
        if !user.write_allowed() {
            return Ok(Reply::new(ReplyCode::FileError, "Write access denied"));
        }
        let from = match session.rename_from.take() {
            Some(p) => p,
            None => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Send RNFR first")),
        };
        let resolver = PathResolver::new(user.root().clone());
        let (to, _) = match resolver.translate(&session.cwd, &self.file) {
            Ok(v) => v,
            Err(_) => return Ok(Reply::new(ReplyCode::FileError, "Invalid path")),
        };
        match tokio::fs::rename(&from, &to).await {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Rename successful")),
            Err(_) => Ok(Reply::new(ReplyCode::TransientFileError, "Rename failed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JsonCredentialStore, NamedUser, StoreAuthenticator};
    use crate::server::controlchan::command::Command;
    use crate::server::controlchan::commands::Rnfr;
    use crate::server::session::Session;
    use crate::server::session_registry::SessionRegistry;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn reply_code(reply: &Reply) -> ReplyCode {
        match reply {
            Reply::CodeAndMsg { code, .. } => *code,
            Reply::MultiLine { code, .. } => *code,
            Reply::None => panic!("expected a reply, got none"),
        }
    }

    fn context(session: crate::server::session::SharedSession<NamedUser>) -> CommandContext<NamedUser> {
        let (tx, _rx) = futures::channel::mpsc::channel(1);
        let store = JsonCredentialStore::new(Vec::new(), false, std::path::PathBuf::from("/tmp"));
        CommandContext {
            cmd: Command::Noop,
            session,
            authenticator: Arc::new(StoreAuthenticator::new(store)),
            tls_configured: false,
            passive_ports: 49152..65535,
            tx,
            local_addr: "127.0.0.1:2121".parse().unwrap(),
            registry: SessionRegistry::new(),
            allow_smnt: false,
            external_ip: None,
            certs_file: None,
            certs_password: None,
        }
    }

    fn authenticated_session(root: std::path::PathBuf) -> crate::server::session::SharedSession<NamedUser> {
        let mut session = Session::new("127.0.0.1:1".parse().unwrap());
        session.user = Some(NamedUser::new("alice".to_string(), root, true));
        Arc::new(Mutex::new(session))
    }

    #[tokio::test]
    async fn rnto_without_a_prior_rnfr_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let session = authenticated_session(dir.path().to_path_buf());
        let reply = Rnto::new("y".to_string()).handle(context(session)).await.unwrap();
        assert_eq!(reply_code(&reply), ReplyCode::BadCommandSequence);
    }

    #[tokio::test]
    async fn rnfr_then_rnto_renames_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x"), b"contents").unwrap();
        let session = authenticated_session(dir.path().to_path_buf());

        let rnfr_reply = Rnfr::new("x".to_string()).handle(context(session.clone())).await.unwrap();
        assert_eq!(reply_code(&rnfr_reply), ReplyCode::FileActionPending);

        let rnto_reply = Rnto::new("y".to_string()).handle(context(session)).await.unwrap();
        assert_eq!(reply_code(&rnto_reply), ReplyCode::FileActionOkay);
        assert!(!dir.path().join("x").exists());
        assert!(dir.path().join("y").exists());
    }
}
