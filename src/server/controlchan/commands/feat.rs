//! The RFC 2389 Feature (`FEAT`) command: advertises the extensions this server
//! implements. Exempt from the login-required gate.

use crate::auth::UserDetail;
use crate::server::controlchan::error::ControlChanError;
use crate::server::controlchan::handler::{CommandContext, CommandHandler};
use crate::server::controlchan::{Reply, ReplyCode};
use async_trait::async_trait;

pub struct Feat;

#[async_trait]
impl<U: UserDetail> CommandHandler<U> for Feat {
    async fn handle(&self, _args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        Ok(Reply::new_multiline(
            ReplyCode::SystemStatus,
            vec![
                "Features:".to_string(),
                "UTF8".to_string(),
                "AUTH TLS".to_string(),
                "PBSZ".to_string(),
                "PROT".to_string(),
                "SIZE".to_string(),
                "MDTM".to_string(),
                "REST STREAM".to_string(),
                "MLST Type*;Size*;Modify*;Perm*;".to_string(),
                "End".to_string(),
            ],
        ))
    }
}
