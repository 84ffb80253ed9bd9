//! The `Server` type that binds the control-channel listener and drives each accepted
//! connection's event loop. Storage is always the host filesystem, so `Server` carries
//! no storage-backend generic; there's also no PROXY protocol switchboard.

use super::chancomms::InternalMsg;
use super::control::ServerControl;
use super::controlchan::command::Command;
use super::controlchan::handler::{CommandContext, CommandHandler};
use super::controlchan::FTPCodec;
use super::controlchan::{ControlChanError, ControlChanErrorKind};
use super::controlchan::{Reply, ReplyCode};
use super::session::{Session, SharedSession};
use super::session_registry::SessionRegistry;
use super::tls;
use crate::auth::{Authenticator, UserDetail};
use crate::metrics;
use controlchan::commands;

use futures::channel::mpsc::channel;
use futures::{SinkExt, StreamExt};
use log::{info, warn};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::codec::Decoder;

use super::controlchan;

const DEFAULT_GREETING: &str = "Welcome";
const DEFAULT_IDLE_SESSION_TIMEOUT_SECS: u64 = 300;

/// Erases the concrete transport type so the control channel can be re-framed after
/// an in-place `AUTH TLS` upgrade without changing the loop's variable types.
trait AsyncIo: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}
impl<T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send> AsyncIo for T {}
type BoxedIo = Box<dyn AsyncIo>;

/// A parsed command or a session-internal event, the two things the control loop
/// selects over.
#[derive(Debug)]
enum Event {
    Command(Command),
    InternalMsg(InternalMsg),
}

/// An instance of the FTP server. Binds a listening socket and spawns one control
/// channel loop per accepted connection.
pub struct Server<U>
where
    U: UserDetail,
{
    greeting: &'static str,
    authenticator: Arc<dyn Authenticator<U>>,
    passive_ports: Range<u16>,
    certs_file: Option<PathBuf>,
    certs_password: Option<String>,
    collect_metrics: bool,
    idle_session_timeout: Duration,
    registry: SessionRegistry,
    control: ServerControl,
    allow_smnt: bool,
    external_ip: Option<std::net::IpAddr>,
    plain_ftp_enabled: bool,
}

impl<U> Server<U>
where
    U: UserDetail + 'static,
{
    /// Construct a new [`Server`] with the given [`Authenticator`]. Other parameters
    /// fall back to sensible defaults; use the builder methods to override them.
    pub fn new(authenticator: Arc<dyn Authenticator<U>>) -> Self {
        Server {
            greeting: DEFAULT_GREETING,
            authenticator,
            passive_ports: 49152..65535,
            certs_file: None,
            certs_password: None,
            collect_metrics: false,
            idle_session_timeout: Duration::from_secs(DEFAULT_IDLE_SESSION_TIMEOUT_SECS),
            registry: SessionRegistry::new(),
            control: ServerControl::new(),
            allow_smnt: false,
            external_ip: None,
            plain_ftp_enabled: true,
        }
    }

    pub fn greeting(mut self, greeting: &'static str) -> Self {
        self.greeting = greeting;
        self
    }

    pub fn passive_ports(mut self, range: Range<u16>) -> Self {
        self.passive_ports = range;
        self
    }

    /// Configures the path to the certificates file (DER-formatted PKCS #12 archive)
    /// and the associated password, enabling `AUTH TLS`.
    pub fn ftps<P: Into<PathBuf>, T: Into<String>>(mut self, certs_file: P, password: T) -> Self {
        self.certs_file = Some(certs_file.into());
        self.certs_password = Some(password.into());
        self
    }

    pub fn metrics(mut self) -> Self {
        self.collect_metrics = true;
        self
    }

    pub fn idle_session_timeout(mut self, secs: u64) -> Self {
        self.idle_session_timeout = Duration::from_secs(secs);
        self
    }

    /// Allow `SMNT` to mount an alternate filesystem structure mid-session.
    pub fn allow_smnt(mut self, allow: bool) -> Self {
        self.allow_smnt = allow;
        self
    }

    /// Reports this address (rather than the local socket address) in `PASV`/`EPSV`
    /// replies, for servers sitting behind NAT.
    pub fn external_ip(mut self, ip: Option<std::net::IpAddr>) -> Self {
        self.external_ip = ip;
        self
    }

    /// Whether unupgraded plaintext control channels may issue commands beyond
    /// `AUTH`/`FEAT`/`HELP`/`QUIT`. Disable once TLS is configured to force `AUTH TLS`.
    pub fn plain_ftp_enabled(mut self, enabled: bool) -> Self {
        self.plain_ftp_enabled = enabled;
        self
    }

    /// A handle into the live session registry, shared with the manager control
    /// endpoint.
    pub fn registry(&self) -> SessionRegistry {
        self.registry.clone()
    }

    /// A handle the manager control endpoint uses to drive `START`/`STOP`/`KILL`.
    pub fn control(&self) -> ServerControl {
        self.control.clone()
    }

    /// Runs the control channel accept loop. Should be spawned in an async runtime.
    /// Starts in the `RUNNING` state; the manager can `STOP`/`START` it from there.
    pub async fn listen<T: Into<String>>(self, bind_address: T) -> std::io::Result<()> {
        let addr: std::net::SocketAddr = bind_address.into().parse().map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid bind address"))?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on {}", addr);
        self.control.start().await;
        loop {
            if self.control.status().await == super::control::ServerStatus::Terminated {
                info!("Server terminated, no longer accepting connections");
                return Ok(());
            }
            if !self.control.is_accepting() {
                self.control.wait_for_stop_signal().await;
                continue;
            }
            tokio::select! {
                accept_result = listener.accept() => {
                    let (tcp_stream, socket_addr) = accept_result?;
                    info!("Incoming control channel connection from {:?}", socket_addr);
                    if let Err(e) = self.spawn_control_channel_loop(tcp_stream).await {
                        warn!("Could not spawn control channel loop for connection: {:?}", e);
                    }
                }
                _ = self.control.wait_for_stop_signal() => {}
            }
        }
    }

    async fn spawn_control_channel_loop(&self, tcp_stream: tokio::net::TcpStream) -> Result<(), ControlChanError> {
        let with_metrics = self.collect_metrics;
        let tls_configured = self.certs_file.is_some() && self.certs_password.is_some();
        let authenticator = self.authenticator.clone();
        let peer_addr = tcp_stream.peer_addr()?;
        let local_addr = tcp_stream.local_addr()?;

        let (control_msg_tx, control_msg_rx) = channel::<InternalMsg>(16);
        let mut session = Session::new(peer_addr);
        session.control_msg_tx = Some(control_msg_tx.clone());
        let session: SharedSession<U> = Arc::new(Mutex::new(session));

        self.registry.register(peer_addr, control_msg_tx.clone()).await;
        if with_metrics {
            metrics::add_session_metric();
        }

        let passive_ports = self.passive_ports.clone();
        let idle_session_timeout = self.idle_session_timeout;
        let identity_file = self.certs_file.clone();
        let identity_password = self.certs_password.clone();
        let greeting = self.greeting;
        let registry = self.registry.clone();
        let allow_smnt = self.allow_smnt;
        let external_ip = self.external_ip;
        let plain_ftp_enabled = self.plain_ftp_enabled;

        let codec = FTPCodec::new();
        let boxed_stream: BoxedIo = Box::new(tcp_stream);
        let cmd_and_reply_stream = codec.framed(boxed_stream);
        let (mut reply_sink, command_source) = cmd_and_reply_stream.split();

        reply_sink.send(Reply::new(ReplyCode::ServiceReady, greeting)).await?;

        let mut command_source = command_source.fuse();
        let mut control_msg_rx = control_msg_rx.fuse();

        tokio::spawn(async move {
            loop {
                let mut timeout_delay = tokio::time::delay_for(idle_session_timeout);
                let incoming = tokio::select! {
                    Some(cmd_result) = command_source.next() => Some(cmd_result.map(Event::Command)),
                    Some(msg) = control_msg_rx.next() => Some(Ok(Event::InternalMsg(msg))),
                    _ = &mut timeout_delay => Some(Err(ControlChanError::new(ControlChanErrorKind::ControlChannelTimeout))),
                };

                match incoming {
                    None => {
                        warn!("No event polled, closing connection");
                        break;
                    }
                    Some(Ok(Event::InternalMsg(InternalMsg::Quit))) => {
                        let _ = reply_sink.send(Reply::new(ReplyCode::ClosingControlConnection, "Bye!")).await;
                        break;
                    }
                    Some(Ok(Event::InternalMsg(InternalMsg::SecureControlChannel))) => {
                        info!("Upgrading control channel to TLS");
                        let codec_io = match reply_sink.reunite(command_source.into_inner()) {
                            Ok(io) => io,
                            Err(_) => break,
                        };
                        let io = codec_io.into_inner();
                        let identity = match (&identity_file, &identity_password) {
                            (Some(f), Some(p)) => tls::identity(f, p.clone()),
                            _ => break,
                        };
                        let identity = match identity {
                            Ok(i) => i,
                            Err(e) => {
                                warn!("failed to load TLS identity: {}", e);
                                break;
                            }
                        };
                        let acceptor = match native_tls::TlsAcceptor::builder(identity).build() {
                            Ok(a) => tokio_tls::TlsAcceptor::from(a),
                            Err(e) => {
                                warn!("failed to build TLS acceptor: {}", e);
                                break;
                            }
                        };
                        let tls_stream = match acceptor.accept(io).await {
                            Ok(s) => s,
                            Err(e) => {
                                warn!("TLS handshake failed: {}", e);
                                break;
                            }
                        };
                        let boxed_stream: BoxedIo = Box::new(tls_stream);
                        let codec = FTPCodec::new();
                        let (sink, src) = codec.framed(boxed_stream).split();
                        reply_sink = sink;
                        command_source = src.fuse();
                        session.lock().await.control_is_tls = true;
                        continue;
                    }
                    Some(Ok(event)) => {
                        if with_metrics {
                            metrics::add_event_metric(&event_label(&event));
                        }
                        let reply = match event {
                            Event::Command(cmd) => {
                                Self::handle_command(
                                    cmd,
                                    session.clone(),
                                    authenticator.clone(),
                                    tls_configured,
                                    passive_ports.clone(),
                                    control_msg_tx.clone(),
                                    local_addr,
                                    registry.clone(),
                                    allow_smnt,
                                    external_ip,
                                    plain_ftp_enabled,
                                    identity_file.clone(),
                                    identity_password.clone(),
                                )
                                .await
                            }
                            Event::InternalMsg(msg) => Self::handle_internal_msg(msg, session.clone()).await,
                        };
                        match reply {
                            Ok(reply) => {
                                let should_close = matches!(&reply, Reply::CodeAndMsg { code: ReplyCode::ClosingControlConnection, .. } | Reply::CodeAndMsg { code: ReplyCode::ServiceNotAvailable, .. });
                                if reply_sink.send(reply).await.is_err() {
                                    break;
                                }
                                if should_close {
                                    break;
                                }
                            }
                            Err(e) => {
                                let reply = Self::handle_control_channel_error(e, with_metrics);
                                let should_close = matches!(&reply, Reply::CodeAndMsg { code: ReplyCode::ClosingControlConnection, .. } | Reply::CodeAndMsg { code: ReplyCode::ServiceNotAvailable, .. });
                                let _ = reply_sink.send(reply).await;
                                if should_close {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        let reply = Self::handle_control_channel_error(e, with_metrics);
                        let should_close = matches!(&reply, Reply::CodeAndMsg { code: ReplyCode::ClosingControlConnection, .. } | Reply::CodeAndMsg { code: ReplyCode::ServiceNotAvailable, .. });
                        let _ = reply_sink.send(reply).await;
                        if should_close {
                            break;
                        }
                    }
                }
            }
            registry.unregister(peer_addr).await;
        });

        Ok(())
    }

    /// The login gate: everything except `USER`/`PASS`/`AUTH`/`FEAT`/`HELP`/`QUIT` and
    /// the handful of Minimum-tier verbs that are defined to work pre-login
    /// (`ACCT`/`NOOP`/`PBSZ`/`PROT`/`SYST`) requires a completed login.
    fn requires_auth(cmd: &Command) -> bool {
        !matches!(
            cmd,
            Command::User { .. }
                | Command::Pass { .. }
                | Command::Auth { .. }
                | Command::Feat
                | Command::Help
                | Command::Quit
                | Command::Acct { .. }
                | Command::Noop
                | Command::PBSZ
                | Command::PROT { .. }
                | Command::Syst
        )
    }

    /// Commands a plaintext, not-yet-upgraded control channel may still issue when
    /// `plain_ftp_enabled` is off: enough to negotiate `AUTH TLS` and leave.
    fn requires_tls(cmd: &Command) -> bool {
        !matches!(cmd, Command::Auth { .. } | Command::Feat | Command::Help | Command::Quit)
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_command(
        cmd: Command,
        session: SharedSession<U>,
        authenticator: Arc<dyn Authenticator<U>>,
        tls_configured: bool,
        passive_ports: Range<u16>,
        tx: futures::channel::mpsc::Sender<InternalMsg>,
        local_addr: std::net::SocketAddr,
        registry: SessionRegistry,
        allow_smnt: bool,
        external_ip: Option<std::net::IpAddr>,
        plain_ftp_enabled: bool,
        certs_file: Option<PathBuf>,
        certs_password: Option<String>,
    ) -> Result<Reply, ControlChanError> {
        {
            let mut locked = session.lock().await;
            if !plain_ftp_enabled && !locked.control_is_tls && Self::requires_tls(&cmd) {
                return Ok(Reply::new(ReplyCode::NotLoggedIn, "TLS required, issue AUTH TLS first"));
            }
            if Self::requires_auth(&cmd) && !locked.is_authenticated() {
                return Ok(Reply::new(ReplyCode::NotLoggedIn, "Please authenticate"));
            }
            if !matches!(cmd, Command::Rnto { .. }) {
                locked.rename_from = None;
            }
            if !matches!(cmd, Command::Rest { .. } | Command::Retr { .. } | Command::Stor { .. } | Command::Appe { .. }) {
                locked.restart_offset = 0;
            }
        }
        let args = CommandContext {
            cmd: cmd.clone(),
            session,
            authenticator,
            tls_configured,
            passive_ports,
            tx,
            local_addr,
            registry,
            allow_smnt,
            external_ip,
            certs_file,
            certs_password,
        };
        Self::dispatch(cmd, args).await
    }

    async fn dispatch(cmd: Command, args: CommandContext<U>) -> Result<Reply, ControlChanError> {
        let handler: Box<dyn CommandHandler<U>> = match cmd {
            Command::User { username } => Box::new(commands::User::new(username)),
            Command::Pass { password } => Box::new(commands::Pass::new(password)),
            Command::Acct { .. } => Box::new(commands::Acct),
            Command::Syst => Box::new(commands::Syst),
            Command::Stat { path } => Box::new(commands::Stat::new(path)),
            Command::Type => Box::new(commands::Type),
            Command::Stru { structure } => Box::new(commands::Stru::new(structure)),
            Command::Mode { mode } => Box::new(commands::Mode::new(mode)),
            Command::Help => Box::new(commands::Help),
            Command::Noop => Box::new(commands::Noop),
            Command::Pasv => Box::new(commands::Pasv::new()),
            Command::Port { addr } => Box::new(commands::Port::new(addr)),
            Command::Eprt { addr } => Box::new(commands::Eprt::new(addr)),
            Command::Epsv { net_prt } => Box::new(commands::Epsv::new(net_prt)),
            Command::Retr { path } => Box::new(commands::Retr::new(path)),
            Command::Stor { path } => Box::new(commands::Stor::new(path)),
            Command::Appe { path } => Box::new(commands::Appe::new(path)),
            Command::List { path } => Box::new(commands::List::new(path)),
            Command::Nlst { path } => Box::new(commands::Nlst::new(path)),
            Command::Mlsd { path } => Box::new(commands::Mlsd::new(path)),
            Command::Mlst { path } => Box::new(commands::Mlst::new(path)),
            Command::Feat => Box::new(commands::Feat),
            Command::Pwd => Box::new(commands::Pwd),
            Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
            Command::Cdup => Box::new(commands::Cdup),
            Command::Opts { option } => Box::new(commands::Opts::new(option)),
            Command::Dele { path } => Box::new(commands::Dele::new(path)),
            Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
            Command::Quit => Box::new(commands::Quit),
            Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
            Command::Allo => Box::new(commands::Allo),
            Command::Abor | Command::TelnetAbort => Box::new(commands::Abor),
            Command::Stou => Box::new(commands::Stou),
            Command::Rnfr { file } => Box::new(commands::Rnfr::new(file)),
            Command::Rnto { file } => Box::new(commands::Rnto::new(file)),
            Command::Auth { protocol } => Box::new(commands::Auth::new(protocol)),
            Command::PBSZ => Box::new(commands::Pbsz),
            Command::PROT { param } => Box::new(commands::Prot::new(param)),
            Command::Size { file } => Box::new(commands::Size::new(file)),
            Command::Rest { offset } => Box::new(commands::Rest::new(offset)),
            Command::Mdtm { file } => Box::new(commands::Mdtm::new(file)),
            Command::Site { args: site_args } => Box::new(commands::Site::new(site_args)),
            Command::Smnt { path } => Box::new(commands::Smnt::new(path)),
        };

        handler.handle(args).await
    }

    async fn handle_internal_msg(msg: InternalMsg, _session: SharedSession<U>) -> Result<Reply, ControlChanError> {
        use InternalMsg::*;

        match msg {
            NotFound => Ok(Reply::new(ReplyCode::FileError, "File not found")),
            SendingData => Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending data")),
            SendData { .. } => Ok(Reply::new(ReplyCode::ClosingDataConnection, "Successfully sent")),
            WriteFailed => Ok(Reply::new(ReplyCode::TransientFileError, "Failed to write file")),
            ConnectionReset => Ok(Reply::new(ReplyCode::ConnectionClosed, "Data channel unexpectedly closed")),
            WrittenData { .. } => Ok(Reply::new(ReplyCode::ClosingDataConnection, "File successfully written")),
            DirectorySuccessfullyListed => Ok(Reply::new(ReplyCode::ClosingDataConnection, "Listed the directory")),
            Quit => Ok(Reply::new(ReplyCode::ClosingControlConnection, "Bye!")),
            SecureControlChannel => Ok(Reply::none()),
        }
    }

    fn handle_control_channel_error(error: ControlChanError, with_metrics: bool) -> Reply {
        if with_metrics {
            metrics::add_error_metric(&error.kind());
        }
        warn!("Control channel error: {}", error);
        match error.kind() {
            ControlChanErrorKind::UnknownCommand => Reply::new(ReplyCode::CommandSyntaxError, "Command not implemented"),
            ControlChanErrorKind::UTF8Error => Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"),
            ControlChanErrorKind::InvalidCommand => Reply::new(ReplyCode::ParameterSyntaxError, "Invalid parameter"),
            ControlChanErrorKind::ControlChannelTimeout => Reply::new(ReplyCode::ServiceNotAvailable, "Session timed out, closing control connection"),
            _ => Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"),
        }
    }
}

fn event_label(event: &Event) -> String {
    match event {
        Event::Command(cmd) => format!("{:?}", cmd),
        Event::InternalMsg(msg) => format!("{:?}", msg),
    }
}
