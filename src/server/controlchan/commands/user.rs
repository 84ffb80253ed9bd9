//! The RFC 959 User Name (`USER`) command — begins the login handshake.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::AuthState;
use async_trait::async_trait;

pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for User {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        if self.username.eq_ignore_ascii_case("anonymous") || self.username.eq_ignore_ascii_case("ftp") {
            if !args.authenticator.anonymous_allowed() {
                return Ok(Reply::new(ReplyCode::NotLoggedIn, "Anonymous logins not allowed"));
            }
            let user = args.authenticator.anonymous_user();
            let username = user.username().to_string();
            let mut session = args.session.lock().await;
            session.user = Some(user);
            session.auth_state = AuthState::Anonymous;
            let peer_addr = session.peer_addr;
            drop(session);
            args.registry.set_username(peer_addr, username).await;
            return Ok(Reply::new(ReplyCode::UserLoggedIn, "Anonymous user logged in"));
        }
        let mut session = args.session.lock().await;
        session.auth_state = AuthState::AwaitingPassword { username: self.username.clone() };
        Ok(Reply::new(ReplyCode::NeedPassword, "Please specify the password"))
    }
}
