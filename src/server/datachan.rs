//! The data channel: active (`PORT`/`EPRT`) and passive (`PASV`/`EPSV`) transfer setup,
//! and the REST-aware send/receive loops. Each transfer runs as a background task that
//! owns the data connection and reports its outcome back via [`InternalMsg`]. When the
//! session has negotiated `PROT P`, the connection is upgraded to TLS before any bytes
//! of the transfer itself cross it, mirroring the control channel's `AUTH TLS` upgrade.

use crate::server::chancomms::InternalMsg;
use crate::server::controlchan::ReplyCode;
use crate::server::session::ProtectionLevel;
use crate::server::tls;
use futures::channel::mpsc::{Receiver, Sender};
use futures::{SinkExt, StreamExt};
use log::warn;
use std::net::SocketAddr;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Erases the concrete transport type so a data connection can be either a plain
/// `TcpStream` or a `PROT P`-upgraded TLS stream without splitting every transfer
/// function into TLS/non-TLS variants.
trait DataIo: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}
impl<T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send> DataIo for T {}
type BoxedDataIo = Box<dyn DataIo>;

/// TLS material needed to upgrade a data connection under `PROT P`. Mirrors the
/// control channel's `certs_file`/`certs_password` pair.
#[derive(Clone, Default)]
pub struct DataTlsConfig {
    pub identity_file: Option<PathBuf>,
    pub identity_password: Option<String>,
}

/// How the data channel will be established for the next transfer, set by the most
/// recent `PORT`/`EPRT` or `PASV`/`EPSV`.
#[derive(Debug, Clone)]
pub enum DataEndpoint {
    /// Client told us where to connect (active mode).
    Active(SocketAddr),
    /// We're listening and waiting for the client to connect (passive mode).
    Passive(SocketAddr),
}

/// Time a passive listener waits for the client to connect before giving up.
const PASSIVE_ACCEPT_TIMEOUT: Duration = Duration::from_secs(30);
/// Time a data connection may sit idle mid-transfer before being torn down.
const TRANSFER_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);
/// Fixed write-chunk size for streamed transfers.
const WRITE_CHUNK_SIZE: usize = 1024 * 32;

/// Binds an ephemeral listener in `passive_ports` for `PASV`/`EPSV`, returning the
/// bound address to report back to the client in the reply.
pub async fn bind_passive(passive_ports: Range<u16>, local_ip: std::net::IpAddr) -> std::io::Result<(TcpListener, SocketAddr)> {
    for port in passive_ports {
        let addr = SocketAddr::new(local_ip, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let bound = listener.local_addr()?;
                return Ok((listener, bound));
            }
            Err(_) => continue,
        }
    }
    Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "no free port in passive range"))
}

/// Establishes the data connection per `endpoint`, waiting at most
/// [`PASSIVE_ACCEPT_TIMEOUT`] for a passive accept.
async fn connect(endpoint: &DataEndpoint, passive_listener: Option<TcpListener>) -> std::io::Result<TcpStream> {
    match endpoint {
        DataEndpoint::Active(addr) => TcpStream::connect(addr).await,
        DataEndpoint::Passive(_) => {
            let listener = passive_listener.expect("passive endpoint requires a bound listener");
            let accept = listener.accept();
            match tokio::time::timeout(PASSIVE_ACCEPT_TIMEOUT, accept).await {
                Ok(Ok((stream, _))) => Ok(stream),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "passive accept timed out")),
            }
        }
    }
}

/// Establishes the data connection exactly as [`connect`] does, then upgrades it to
/// TLS if `protection` is [`ProtectionLevel::Private`]. The server always plays the
/// TLS server role on the data channel, the same as it does on the control channel,
/// regardless of whether the TCP connection was dialed out (`PORT`/`EPRT`) or
/// accepted (`PASV`/`EPSV`).
async fn establish(endpoint: &DataEndpoint, passive_listener: Option<TcpListener>, protection: ProtectionLevel, tls_config: &DataTlsConfig) -> std::io::Result<BoxedDataIo> {
    let stream = connect(endpoint, passive_listener).await?;
    if protection != ProtectionLevel::Private {
        return Ok(Box::new(stream));
    }
    let (file, password) = match (&tls_config.identity_file, &tls_config.identity_password) {
        (Some(f), Some(p)) => (f, p.clone()),
        _ => return Err(std::io::Error::new(std::io::ErrorKind::Other, "PROT P requires a configured TLS identity")),
    };
    let identity = tls::identity(file, password)?;
    let acceptor = native_tls::TlsAcceptor::builder(identity).build().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let acceptor = tokio_tls::TlsAcceptor::from(acceptor);
    let tls_stream = acceptor.accept(stream).await.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(Box::new(tls_stream))
}

/// RETR: streams `path` from `offset` to the data connection, reporting the outcome
/// via `tx`. `abort_rx` fires if `ABOR` is received while the transfer is running.
#[allow(clippy::too_many_arguments)]
pub async fn send_file(endpoint: DataEndpoint, passive_listener: Option<TcpListener>, path: PathBuf, offset: u64, mut tx: Sender<InternalMsg>, mut abort_rx: Receiver<()>, protection: ProtectionLevel, tls_config: DataTlsConfig) {
    let mut stream = match establish(&endpoint, passive_listener, protection, &tls_config).await {
        Ok(s) => s,
        Err(e) => {
            warn!("data connection failed: {}", e);
            let _ = tx.send(InternalMsg::ConnectionReset).await;
            return;
        }
    };

    let mut file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(_) => {
            let _ = tx.send(InternalMsg::NotFound).await;
            return;
        }
    };
    if offset > 0 {
        use tokio::io::AsyncSeekExt;
        if file.seek(std::io::SeekFrom::Start(offset)).await.is_err() {
            let _ = tx.send(InternalMsg::WriteFailed).await;
            return;
        }
    }

    let _ = tx.send(InternalMsg::SendingData).await;
    let mut buf = vec![0u8; WRITE_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let read_fut = file.read(&mut buf);
        tokio::select! {
            _ = abort_rx.next() => {
                let _ = stream.shutdown().await;
                let _ = tx.send(InternalMsg::ConnectionReset).await;
                return;
            }
            res = tokio::time::timeout(TRANSFER_INACTIVITY_TIMEOUT, read_fut) => {
                let n = match res {
                    Ok(Ok(0)) => break,
                    Ok(Ok(n)) => n,
                    Ok(Err(_)) | Err(_) => {
                        let _ = tx.send(InternalMsg::ConnectionReset).await;
                        return;
                    }
                };
                if stream.write_all(&buf[..n]).await.is_err() {
                    let _ = tx.send(InternalMsg::ConnectionReset).await;
                    return;
                }
                total += n as u64;
            }
        }
    }
    let _ = stream.shutdown().await;
    let _ = tx.send(InternalMsg::SendData { bytes: total }).await;
}

/// STOR/STOU/APPE: writes bytes read from the data connection into `path`, reporting
/// the outcome via `tx`. `append` selects `APPE` semantics (open for append, don't
/// truncate). `abort_rx` fires if `ABOR` is received while the transfer is running.
#[allow(clippy::too_many_arguments)]
pub async fn recv_file(endpoint: DataEndpoint, passive_listener: Option<TcpListener>, path: PathBuf, append: bool, mut tx: Sender<InternalMsg>, mut abort_rx: Receiver<()>, protection: ProtectionLevel, tls_config: DataTlsConfig) {
    let mut stream = match establish(&endpoint, passive_listener, protection, &tls_config).await {
        Ok(s) => s,
        Err(e) => {
            warn!("data connection failed: {}", e);
            let _ = tx.send(InternalMsg::ConnectionReset).await;
            return;
        }
    };

    let mut open_opts = tokio::fs::OpenOptions::new();
    open_opts.write(true).create(true);
    if append {
        open_opts.append(true);
    } else {
        open_opts.truncate(true);
    }
    let mut file = match open_opts.open(&path).await {
        Ok(f) => f,
        Err(_) => {
            let _ = tx.send(InternalMsg::WriteFailed).await;
            return;
        }
    };

    let mut buf = vec![0u8; WRITE_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let read_fut = stream.read(&mut buf);
        tokio::select! {
            _ = abort_rx.next() => {
                let _ = tx.send(InternalMsg::ConnectionReset).await;
                return;
            }
            res = tokio::time::timeout(TRANSFER_INACTIVITY_TIMEOUT, read_fut) => {
                let n = match res {
                    Ok(Ok(0)) => break,
                    Ok(Ok(n)) => n,
                    Ok(Err(_)) | Err(_) => {
                        let _ = tx.send(InternalMsg::ConnectionReset).await;
                        return;
                    }
                };
                if file.write_all(&buf[..n]).await.is_err() {
                    let _ = tx.send(InternalMsg::WriteFailed).await;
                    return;
                }
                total += n as u64;
            }
        }
    }
    let _ = tx.send(InternalMsg::WrittenData { bytes: total }).await;
}

/// LIST/NLST/MLSD: writes a pre-rendered directory listing to the data connection.
/// `abort_rx` fires if `ABOR` is received while the listing is being sent.
#[allow(clippy::too_many_arguments)]
pub async fn send_listing(endpoint: DataEndpoint, passive_listener: Option<TcpListener>, listing: String, mut tx: Sender<InternalMsg>, mut abort_rx: Receiver<()>, protection: ProtectionLevel, tls_config: DataTlsConfig) {
    let mut stream = match establish(&endpoint, passive_listener, protection, &tls_config).await {
        Ok(s) => s,
        Err(e) => {
            warn!("data connection failed: {}", e);
            let _ = tx.send(InternalMsg::ConnectionReset).await;
            return;
        }
    };
    tokio::select! {
        _ = abort_rx.next() => {
            let _ = stream.shutdown().await;
            let _ = tx.send(InternalMsg::ConnectionReset).await;
        }
        res = stream.write_all(listing.as_bytes()) => {
            if res.is_err() {
                let _ = tx.send(InternalMsg::ConnectionReset).await;
                return;
            }
            let _ = stream.shutdown().await;
            let _ = tx.send(InternalMsg::DirectorySuccessfullyListed).await;
        }
    }
}

impl ReplyCode {
    /// `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` per RFC 959.
    pub fn pasv_reply_text(addr: SocketAddr) -> String {
        let port = addr.port();
        let (p1, p2) = (port >> 8, port & 0xff);
        match addr.ip() {
            std::net::IpAddr::V4(ip) => {
                let o = ip.octets();
                format!("Entering Passive Mode ({},{},{},{},{},{})", o[0], o[1], o[2], o[3], p1, p2)
            }
            std::net::IpAddr::V6(_) => format!("Entering Extended Passive Mode (|||{}|)", port),
        }
    }
}
