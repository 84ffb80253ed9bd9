//! The `ServerConfig` settings snapshot, loaded from a TOML file and overridable from
//! the command line. Consumed once at boot; nothing below is reloaded except via a
//! manager `STOP`/`START` cycle that reconstructs the whole `Server`.

use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;

fn default_server_name() -> String {
    "wharfftpd".to_string()
}
fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
fn default_port() -> u16 {
    2221
}
fn default_write_bytes() -> usize {
    32_768
}
fn default_connection_list_update_ms() -> u64 {
    5_000
}
fn default_log_flush_ms() -> u64 {
    1_000
}
fn default_organization() -> String {
    "wharfftp".to_string()
}
fn default_application() -> String {
    "wharfftpd".to_string()
}

/// The settings snapshot enumerated for the manager/server boot sequence. All fields
/// default per the values above if absent from the TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_server_version")]
    pub server_version: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub allow_smnt: bool,
    #[serde(default = "default_write_bytes")]
    pub write_bytes: usize,
    #[serde(default)]
    pub tls_enabled: bool,
    #[serde(default = "default_true")]
    pub plain_ftp_enabled: bool,
    #[serde(default)]
    pub anonymous_enabled: bool,
    pub key_path: Option<PathBuf>,
    pub cert_path: Option<PathBuf>,
    /// Password for the PKCS #12 archive at `cert_path` (the TLS backend accepts a
    /// single combined identity archive, not separate cert/key PEM files).
    #[serde(default)]
    pub tls_password: String,
    #[serde(default = "default_connection_list_update_ms")]
    pub connection_list_update_ms: u64,
    #[serde(default = "default_log_flush_ms")]
    pub log_flush_ms: u64,
    pub external_ip: Option<IpAddr>,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default = "default_application")]
    pub application: String,
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            server_name: default_server_name(),
            server_version: default_server_version(),
            port: default_port(),
            allow_smnt: false,
            write_bytes: default_write_bytes(),
            tls_enabled: false,
            plain_ftp_enabled: true,
            anonymous_enabled: false,
            key_path: None,
            cert_path: None,
            tls_password: String::new(),
            connection_list_update_ms: default_connection_list_update_ms(),
            log_flush_ms: default_log_flush_ms(),
            external_ip: None,
            organization: default_organization(),
            application: default_application(),
        }
    }
}

impl ServerConfig {
    /// Parses a TOML settings file; missing fields fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub async fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_toml_str(&text)?)
    }

    /// The manager's local socket address, derived `<organization>.<application>.Manager`-
    /// style into a filesystem path for a UNIX domain socket.
    pub fn manager_socket_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("{}.{}.Manager", self.organization, self.application))
    }
}

/// Exit codes per the boot sequence's fatal-error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Clean = 0,
    ConfigError = 1,
    BindFailure = 2,
    TlsMaterialError = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_for_an_empty_file() {
        let cfg = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.port, 2221);
        assert_eq!(cfg.write_bytes, 32_768);
        assert_eq!(cfg.connection_list_update_ms, 5_000);
        assert_eq!(cfg.log_flush_ms, 1_000);
        assert!(cfg.plain_ftp_enabled);
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cfg = ServerConfig::from_toml_str("port = 2121\nanonymous_enabled = true\n").unwrap();
        assert_eq!(cfg.port, 2121);
        assert!(cfg.anonymous_enabled);
        assert_eq!(cfg.write_bytes, 32_768);
    }
}
