//! Per-connection session state: the data a control channel's event loop and its
//! command handlers share, guarded by a single `tokio::sync::Mutex`.

use crate::auth::UserDetail;
use crate::server::chancomms::ControlMsgSender;
use crate::server::datachan::DataEndpoint;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Where the session's control channel is in the login handshake.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AuthState {
    AwaitingUser,
    AwaitingPassword { username: String },
    Authenticated,
    Anonymous,
}

/// ASCII vs. binary representation type as set by `TYPE`. Only `TYPE I`/`TYPE A` are
/// meaningfully distinguished; byte-for-byte transfer either way, no CRLF translation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl Default for TransferType {
    fn default() -> Self {
        TransferType::Binary
    }
}

/// Stream vs. the other RFC 959 transfer modes. Only Stream is implemented; block and
/// compressed modes are out of scope.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TransferMode {
    Stream,
}

impl Default for TransferMode {
    fn default() -> Self {
        TransferMode::Stream
    }
}

/// Data channel protection level, toggled by `PROT` after `AUTH TLS`/`PBSZ`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProtectionLevel {
    Clear,
    Private,
}

impl Default for ProtectionLevel {
    fn default() -> Self {
        ProtectionLevel::Clear
    }
}

/// Full per-connection state machine: auth state, cwd, transfer type/mode, pending
/// rename source, restart offset, data endpoint, protection level/pbsz, whether the
/// control channel itself is TLS, and whether an ABOR is pending.
pub struct Session<U: UserDetail> {
    pub auth_state: AuthState,
    pub user: Option<U>,
    pub cwd: String,
    pub transfer_type: TransferType,
    pub transfer_mode: TransferMode,
    pub rename_from: Option<PathBuf>,
    pub restart_offset: u64,
    pub data_endpoint: Option<DataEndpoint>,
    pub passive_listener: Option<tokio::net::TcpListener>,
    pub protection_level: ProtectionLevel,
    pub pbsz: Option<u32>,
    pub control_is_tls: bool,
    pub abort_pending: bool,
    pub data_abort_tx: Option<futures::channel::mpsc::Sender<()>>,
    pub control_msg_tx: Option<ControlMsgSender>,
    pub peer_addr: std::net::SocketAddr,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub auth_failures: u32,
}

impl<U: UserDetail> Session<U> {
    pub fn new(peer_addr: std::net::SocketAddr) -> Self {
        let now = Instant::now();
        Session {
            auth_state: AuthState::AwaitingUser,
            user: None,
            cwd: "/".to_string(),
            transfer_type: TransferType::default(),
            transfer_mode: TransferMode::default(),
            rename_from: None,
            restart_offset: 0,
            data_endpoint: None,
            passive_listener: None,
            protection_level: ProtectionLevel::default(),
            pbsz: None,
            control_is_tls: false,
            abort_pending: false,
            data_abort_tx: None,
            control_msg_tx: None,
            peer_addr,
            connected_at: now,
            last_activity: now,
            auth_failures: 0,
        }
    }

    /// True once `USER`/`PASS` (or anonymous login) has completed. Commands other than
    /// `USER`/`PASS`/`AUTH`/`FEAT`/`HELP`/`QUIT` require this.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state, AuthState::Authenticated | AuthState::Anonymous)
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Shared, lock-guarded handle to a [`Session`], cloned into every command handler's
/// [`CommandContext`](super::controlchan::handler::CommandContext).
pub type SharedSession<U> = Arc<Mutex<Session<U>>>;
