//! The RFC 959 Password (`PASS`) command — completes the login handshake.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use crate::server::session::AuthState;
use async_trait::async_trait;

/// Consecutive PASS failures on one session before it's dropped with 421.
const MAX_AUTH_FAILURES: u32 = 3;

pub struct Pass {
    password: String,
}

impl Pass {
    pub fn new(password: String) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Pass {
    async fn handle(&self, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let username = {
            let mut session = args.session.lock().await;
            match &session.auth_state {
                AuthState::AwaitingPassword { username } => username.clone(),
                AuthState::Anonymous => {
                    let user = args.authenticator.anonymous_user();
                    let username = user.username().to_string();
                    session.user = Some(user);
                    session.auth_state = AuthState::Authenticated;
                    let peer_addr = session.peer_addr;
                    drop(session);
                    args.registry.set_username(peer_addr, username).await;
                    return Ok(Reply::new(ReplyCode::UserLoggedIn, "Anonymous user logged in"));
                }
                _ => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Send USER first")),
            }
        };
        match args.authenticator.authenticate(&username, &self.password).await {
            Ok(user) => {
                let mut session = args.session.lock().await;
                let peer_addr = session.peer_addr;
                session.user = Some(user);
                session.auth_state = AuthState::Authenticated;
                drop(session);
                args.registry.set_username(peer_addr, username).await;
                Ok(Reply::new(ReplyCode::UserLoggedIn, "User logged in, proceed"))
            }
            Err(_) => {
                crate::metrics::add_auth_failure_metric();
                let mut session = args.session.lock().await;
                session.auth_state = AuthState::AwaitingUser;
                session.auth_failures += 1;
                if session.auth_failures >= MAX_AUTH_FAILURES {
                    return Ok(Reply::new(ReplyCode::ServiceNotAvailable, "Too many authentication failures, closing connection"));
                }
                Ok(Reply::new(ReplyCode::NotLoggedIn, "Authentication failed"))
            }
        }
    }
}
