//! Credential lookup and virtual-path ↔ host-path translation.
//!
//! The session state machine only ever talks to the `Authenticator` trait object, so a
//! deployment can swap in any [`CredentialStore`] without touching `server::session` or
//! the command handlers.

mod resolver;

pub use resolver::{normalize_virtual, PathResolver, ResolveError};

use async_trait::async_trait;
use ring::constant_time;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

/// Per-user details handed back on successful authentication and stashed on the
/// [`Session`](crate::server::session::Session).
pub trait UserDetail: Debug + Send + Sync + 'static {
    /// The user's virtual filesystem root (an absolute host path).
    fn root(&self) -> &PathBuf;
    /// Whether this user may STOR/DELE/RMD/MKD/RNTO.
    fn write_allowed(&self) -> bool;
    /// Username as presented to `USER`.
    fn username(&self) -> &str;
}

/// A fully authenticated, named user record.
#[derive(Debug, Clone)]
pub struct NamedUser {
    username: String,
    root: PathBuf,
    write_allowed: bool,
}

impl NamedUser {
    pub fn new(username: String, root: PathBuf, write_allowed: bool) -> Self {
        NamedUser { username, root, write_allowed }
    }
}

impl UserDetail for NamedUser {
    fn root(&self) -> &PathBuf {
        &self.root
    }
    fn write_allowed(&self) -> bool {
        self.write_allowed
    }
    fn username(&self) -> &str {
        &self.username
    }
}

/// Failure modes surfaced by an [`Authenticator`] implementation.
#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum AuthError {
    #[error("no such user")]
    NoSuchUser,
    #[error("user disabled")]
    Disabled,
    #[error("bad password")]
    BadPassword,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Authenticates `USER`/`PASS` pairs, so alternative credential backends (LDAP, PAM, a
/// REST call) can be dropped in without touching the session state machine. Only one
/// implementation ships: [`JsonCredentialStore`].
#[async_trait]
pub trait Authenticator<U: UserDetail>: Sync + Send {
    /// Verify `username`/`password` and return the resulting user detail.
    async fn authenticate(&self, username: &str, password: &str) -> Result<U, AuthError>;

    /// Whether `anonymous`/`ftp` logins succeed without a password check.
    fn anonymous_allowed(&self) -> bool {
        false
    }

    /// The root to use for anonymous sessions, if [`anonymous_allowed`](Self::anonymous_allowed) is true.
    fn anonymous_root(&self) -> PathBuf {
        PathBuf::from("/srv/ftp/anonymous")
    }

    /// The user detail handed to an anonymous session once `PASS` completes the
    /// handshake. Anonymous logins carry no credential check.
    fn anonymous_user(&self) -> U;
}

/// One record in the credential store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Hex-encoded SHA-256 of `salt || password`.
    pub password_hash: String,
    pub salt: String,
    pub root_path: PathBuf,
    pub enabled: bool,
    pub write_allowed: bool,
}

/// The credential store interface: `get_user`/`anonymous_allowed`. Treated as an opaque
/// provider — persistent credential storage and its management are out of scope, so
/// only a JSON-file-backed implementation ships.
pub trait CredentialStore: Send + Sync {
    fn get_user(&self, username: &str) -> Option<UserRecord>;
    fn anonymous_allowed(&self) -> bool;
    fn anonymous_root(&self) -> PathBuf;
}

/// Loads a `Vec<UserRecord>` from a JSON file once at startup and serves lookups
/// against the in-memory snapshot. Read-only; reloaded by a manager STOP/START cycle.
#[derive(Debug)]
pub struct JsonCredentialStore {
    users: Vec<UserRecord>,
    anonymous_allowed: bool,
    anonymous_root: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(users: Vec<UserRecord>, anonymous_allowed: bool, anonymous_root: PathBuf) -> Self {
        JsonCredentialStore {
            users,
            anonymous_allowed,
            anonymous_root,
        }
    }

    /// Loads the store from a JSON file containing a `[UserRecord]` array.
    pub fn load(path: &std::path::Path, anonymous_allowed: bool, anonymous_root: PathBuf) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let users: Vec<UserRecord> = serde_json::from_str(&data)?;
        Ok(JsonCredentialStore::new(users, anonymous_allowed, anonymous_root))
    }
}

impl CredentialStore for JsonCredentialStore {
    fn get_user(&self, username: &str) -> Option<UserRecord> {
        self.users.iter().find(|u| u.username == username).cloned()
    }

    fn anonymous_allowed(&self) -> bool {
        self.anonymous_allowed
    }

    fn anonymous_root(&self) -> PathBuf {
        self.anonymous_root.clone()
    }
}

/// Hashes `password` salted with `salt` using SHA-256 and returns the hex digest, for
/// comparison against [`UserRecord::password_hash`].
pub fn hash_password(salt: &str, password: &str) -> String {
    use ring::digest;
    let mut input = Vec::with_capacity(salt.len() + password.len());
    input.extend_from_slice(salt.as_bytes());
    input.extend_from_slice(password.as_bytes());
    let digest = digest::digest(&digest::SHA256, &input);
    hex_encode(digest.as_ref())
}

/// Constant-time comparison of two salted hashes.
pub fn verify_password(record: &UserRecord, password: &str) -> bool {
    let computed = hash_password(&record.salt, password);
    constant_time::verify_slices_are_equal(computed.as_bytes(), record.password_hash.as_bytes()).is_ok()
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Bridges a [`CredentialStore`] to the [`Authenticator`] trait used by the session
/// state machine.
pub struct StoreAuthenticator<C: CredentialStore> {
    store: C,
}

impl<C: CredentialStore> StoreAuthenticator<C> {
    pub fn new(store: C) -> Self {
        StoreAuthenticator { store }
    }
}

#[async_trait]
impl<C: CredentialStore> Authenticator<NamedUser> for StoreAuthenticator<C> {
    async fn authenticate(&self, username: &str, password: &str) -> Result<NamedUser, AuthError> {
        let record = self.store.get_user(username).ok_or(AuthError::NoSuchUser)?;
        if !record.enabled {
            return Err(AuthError::Disabled);
        }
        if !verify_password(&record, password) {
            return Err(AuthError::BadPassword);
        }
        Ok(NamedUser::new(record.username, record.root_path, record.write_allowed))
    }

    fn anonymous_allowed(&self) -> bool {
        self.store.anonymous_allowed()
    }

    fn anonymous_root(&self) -> PathBuf {
        self.store.anonymous_root()
    }

    fn anonymous_user(&self) -> NamedUser {
        NamedUser::new("anonymous".to_string(), self.store.anonymous_root(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_salt_sensitive() {
        let a = hash_password("salt1", "hunter2");
        let b = hash_password("salt1", "hunter2");
        let c = hash_password("salt2", "hunter2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn verify_password_rejects_wrong_password() {
        let record = UserRecord {
            username: "bob".into(),
            password_hash: hash_password("abc", "correct horse"),
            salt: "abc".into(),
            root_path: PathBuf::from("/srv/ftp/bob"),
            enabled: true,
            write_allowed: true,
        };
        assert!(verify_password(&record, "correct horse"));
        assert!(!verify_password(&record, "wrong"));
    }
}
