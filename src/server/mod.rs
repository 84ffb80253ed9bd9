//! The FTP server: control channel, data channel, session state and the live session
//! registry the manager endpoint queries.

pub mod chancomms;
pub mod control;
pub mod controlchan;
pub mod datachan;
pub mod ftpserver;
pub mod listing;
pub mod session;
pub mod session_registry;
pub mod tls;

pub use control::{ServerControl, ServerStatus};
pub use ftpserver::Server;
