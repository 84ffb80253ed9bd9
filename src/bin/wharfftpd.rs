//! The `wharfftpd` binary: wires [`wharfftp::config::ServerConfig`] and the CLI to a
//! [`wharfftp::server::Server`] and its manager control endpoint.

use clap::Parser;
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use wharfftp::auth::{JsonCredentialStore, NamedUser, StoreAuthenticator};
use wharfftp::config::{ExitCode as AppExitCode, ServerConfig};
use wharfftp::manager::ManagerEndpoint;
use wharfftp::{logging, Server};

#[derive(Parser, Debug)]
#[command(name = "wharfftpd", about = "Safe, concurrent FTP(S) server")]
struct Cli {
    /// Path to a TOML settings file; if absent, built-in defaults apply.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to the JSON credential store; required unless only anonymous access is used.
    #[arg(long)]
    users: Option<PathBuf>,
    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,
    /// Override the bind address's host part.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ServerConfig::load(path).await {
            Ok(c) => c,
            Err(e) => {
                error!("failed to load config {:?}: {}", path, e);
                return ExitCode::from(AppExitCode::ConfigError as u8);
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    if let Err(e) = logging::init(LevelFilter::Info, config.log_flush_ms) {
        eprintln!("failed to install logger: {}", e);
    }

    let store = match &cli.users {
        Some(path) => match JsonCredentialStore::load(path, config.anonymous_enabled, PathBuf::from("/srv/ftp/anonymous")) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to load credential store {:?}: {}", path, e);
                return ExitCode::from(AppExitCode::ConfigError as u8);
            }
        },
        None => JsonCredentialStore::new(Vec::new(), config.anonymous_enabled, PathBuf::from("/srv/ftp/anonymous")),
    };
    let authenticator: Arc<dyn wharfftp::auth::Authenticator<NamedUser>> = Arc::new(StoreAuthenticator::new(store));

    let mut server: Server<NamedUser> = Server::new(authenticator)
        .metrics()
        .allow_smnt(config.allow_smnt)
        .external_ip(config.external_ip)
        .plain_ftp_enabled(config.plain_ftp_enabled);
    if config.tls_enabled {
        match &config.cert_path {
            Some(cert) => server = server.ftps(cert.clone(), config.tls_password.clone()),
            None => {
                error!("tls_enabled is set but no cert_path was configured");
                return ExitCode::from(AppExitCode::TlsMaterialError as u8);
            }
        }
    }

    let control = server.control();
    let registry = server.registry();
    let log_sink = logging::sink();
    let manager_socket = config.manager_socket_path();
    let manager = ManagerEndpoint::new(manager_socket, control, registry, log_sink);

    let manager_handle = tokio::spawn(async move {
        if let Err(e) = manager.listen().await {
            error!("manager endpoint failed: {}", e);
        }
    });

    let bind_address = format!("{}:{}", cli.bind, config.port);
    info!("wharfftpd starting on {}", bind_address);
    let server_result = server.listen(bind_address).await;
    manager_handle.abort();

    match server_result {
        Ok(()) => ExitCode::from(AppExitCode::Clean as u8),
        Err(e) => {
            error!("server bind/accept failure: {}", e);
            ExitCode::from(AppExitCode::BindFailure as u8)
        }
    }
}
