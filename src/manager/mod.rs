//! The out-of-band manager control endpoint: a local UNIX-domain socket, single
//! consumer enforced, that can query and drive the `Server`'s lifecycle and stream
//! its log.

pub mod protocol;

use crate::logging::LogSink;
use crate::server::session_registry::SessionRegistry;
use crate::server::ServerControl;
use futures::future::pending;
use futures::{SinkExt, StreamExt};
use log::{info, warn};
use protocol::ManagerCommand;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tokio_util::codec::{Decoder, LinesCodec};

/// Binds the manager socket and serves connections one at a time, refusing any
/// additional connector while one is already attached.
pub struct ManagerEndpoint {
    socket_path: PathBuf,
    control: ServerControl,
    registry: SessionRegistry,
    log_sink: LogSink,
    connected: Arc<AtomicBool>,
}

impl ManagerEndpoint {
    pub fn new<P: Into<PathBuf>>(socket_path: P, control: ServerControl, registry: SessionRegistry, log_sink: LogSink) -> Self {
        ManagerEndpoint {
            socket_path: socket_path.into(),
            control,
            registry,
            log_sink,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs the accept loop. Should be spawned alongside the FTP server's own.
    pub async fn listen(self) -> std::io::Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        let listener = UnixListener::bind(&self.socket_path)?;
        info!("Manager endpoint listening on {:?}", self.socket_path);
        loop {
            let (stream, _) = listener.accept().await?;
            if self.connected.compare_and_swap(false, true, Ordering::SeqCst) {
                tokio::spawn(refuse(stream));
                continue;
            }
            let control = self.control.clone();
            let registry = self.registry.clone();
            let log_sink = self.log_sink.clone();
            let connected = self.connected.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, control, registry, log_sink).await {
                    warn!("manager connection ended with error: {}", e);
                }
                connected.store(false, Ordering::SeqCst);
            });
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

async fn refuse(stream: UnixStream) {
    let mut framed = LinesCodec::new().framed(stream);
    let _ = framed.send("ERROR manager already connected".to_string()).await;
}

async fn recv_or_pending(rx: &mut Option<broadcast::Receiver<String>>) -> Option<String> {
    match rx {
        Some(r) => loop {
            match r.recv().await {
                Ok(line) => return Some(line),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        },
        None => pending().await,
    }
}

async fn handle_connection(stream: UnixStream, control: ServerControl, registry: SessionRegistry, log_sink: LogSink) -> anyhow::Result<()> {
    let (mut sink, mut stream) = LinesCodec::new().framed(stream).split();
    let mut logging_enabled = false;
    let mut log_rx: Option<broadcast::Receiver<String>> = None;

    loop {
        tokio::select! {
            line = stream.next() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    Some(Err(_)) | None => break,
                };
                match line.parse::<ManagerCommand>() {
                    Ok(ManagerCommand::Status) => {
                        sink.send(format!("STATUS {}", control.status().await.as_str())).await?;
                    }
                    Ok(ManagerCommand::Start) => {
                        sink.send(format!("STATUS {}", control.start().await.as_str())).await?;
                    }
                    Ok(ManagerCommand::Stop) => {
                        sink.send(format!("STATUS {}", control.stop().await.as_str())).await?;
                    }
                    Ok(ManagerCommand::Kill) => {
                        registry.kill_all().await;
                        sink.send(format!("STATUS {}", control.kill().await.as_str())).await?;
                    }
                    Ok(ManagerCommand::Connections) => {
                        for info in registry.snapshot().await {
                            let line = format!("{}\t{}\t{}\t{}", info.id, info.peer_addr, info.username.as_deref().unwrap_or(""), info.cwd);
                            sink.send(line).await?;
                        }
                    }
                    Ok(ManagerCommand::LoggingOn) => {
                        logging_enabled = true;
                    }
                    Ok(ManagerCommand::LoggingOff) => {
                        logging_enabled = false;
                        log_rx = None;
                    }
                    Ok(ManagerCommand::LogOutput) => {
                        if logging_enabled {
                            log_rx = Some(log_sink.subscribe());
                        } else {
                            sink.send("ERROR logging not enabled".to_string()).await?;
                        }
                    }
                    Err(e) => {
                        sink.send(format!("ERROR {}", e)).await?;
                    }
                }
            }
            text = recv_or_pending(&mut log_rx) => {
                match text {
                    Some(text) => { sink.send(format!("LOGOUTPUT {}", text)).await?; }
                    None => { log_rx = None; }
                }
            }
        }
    }
    Ok(())
}
