//! Black-box scenarios driven through a real `ftp::FtpStream` client against a
//! `wharfftp::Server` hosted on a background `tokio::runtime::Runtime`.

use ftp::FtpStream;
use pretty_assertions::assert_eq;
use std::fmt::{Debug, Display};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wharfftp::auth::{hash_password, Authenticator, JsonCredentialStore, NamedUser, StoreAuthenticator, UserRecord};
use wharfftp::Server;

static TESTPORT: AtomicU16 = AtomicU16::new(21210);

fn ensure_login_required<T: Debug, E: Display>(r: Result<T, E>) {
    let err = r.unwrap_err().to_string();
    if !err.contains("530") {
        panic!("command should have required login, got: {}", err);
    }
}

/// A running server plus the temp directory backing its root, kept alive for the
/// caller's lifetime (the `Runtime` must not be dropped before the test finishes).
struct Harness {
    root: tempfile::TempDir,
    _rt: tokio::runtime::Runtime,
    addr: String,
}

fn harness(authenticator: Arc<dyn Authenticator<NamedUser>>, root: tempfile::TempDir) -> Harness {
    let port = TESTPORT.fetch_add(1, Ordering::Relaxed);
    let addr = format!("127.0.0.1:{}", port);
    let rt = tokio::runtime::Runtime::new().expect("failed to build test runtime");
    let server: Server<NamedUser> = Server::new(authenticator);
    let listen_addr = addr.clone();
    rt.spawn(async move {
        let _ = server.listen(listen_addr).await;
    });
    while FtpStream::connect(&addr).is_err() {
        std::thread::sleep(Duration::from_millis(10));
    }
    Harness { root, _rt: rt, addr }
}

fn anonymous_harness() -> Harness {
    let root = tempfile::tempdir().unwrap();
    let store = JsonCredentialStore::new(Vec::new(), true, root.path().to_path_buf());
    harness(Arc::new(StoreAuthenticator::new(store)), root)
}

fn named_user_harness(username: &str, password: &str, write_allowed: bool) -> Harness {
    let root = tempfile::tempdir().unwrap();
    let salt = "end-to-end-test-salt".to_string();
    let record = UserRecord {
        username: username.to_string(),
        password_hash: hash_password(&salt, password),
        salt,
        root_path: root.path().to_path_buf(),
        enabled: true,
        write_allowed,
    };
    let store = JsonCredentialStore::new(vec![record], false, root.path().to_path_buf());
    harness(Arc::new(StoreAuthenticator::new(store)), root)
}

#[test]
fn anonymous_login_reports_root_and_quits_cleanly() {
    let h = anonymous_harness();
    let mut client = FtpStream::connect(&h.addr).unwrap();

    ensure_login_required(client.pwd());

    client.login("anonymous", "anyone@example.com").unwrap();
    let pwd = client.pwd().unwrap();
    assert_eq!(pwd, "/");
    client.quit().unwrap();
}

#[test]
fn passive_list_of_an_empty_root_returns_no_entries() {
    let h = anonymous_harness();
    let mut client = FtpStream::connect(&h.addr).unwrap();

    ensure_login_required(client.list(None));

    client.login("anonymous", "anyone@example.com").unwrap();
    let entries = client.list(None).unwrap();
    assert!(entries.is_empty(), "expected an empty listing, got {:?}", entries);
    client.quit().unwrap();
}

#[test]
fn stor_then_retr_round_trips_bytes_and_size_matches() {
    let h = named_user_harness("alice", "hunter2", true);
    let payload = b"the quick brown fox jumps over the lazy dog".to_vec();

    let mut unauthenticated = FtpStream::connect(&h.addr).unwrap();
    ensure_login_required(unauthenticated.put("fox.txt", &mut Cursor::new(payload.clone())));

    let mut client = FtpStream::connect(&h.addr).unwrap();
    client.login("alice", "hunter2").unwrap();

    let mut reader = Cursor::new(payload.clone());
    client.put("fox.txt", &mut reader).unwrap();

    let size = client.size("fox.txt").unwrap();
    assert_eq!(size, Some(payload.len()));

    let mut retrieved = client.simple_retr("fox.txt").unwrap();
    let mut out = Vec::new();
    std::io::copy(&mut retrieved, &mut out).unwrap();
    assert_eq!(out, payload);

    client.quit().unwrap();
}

#[test]
fn rename_moves_the_file_on_the_server() {
    let h = named_user_harness("bob", "correcthorse", true);
    std::fs::write(h.root.path().join("x"), b"contents").unwrap();
    let mut client = FtpStream::connect(&h.addr).unwrap();

    client.login("bob", "correcthorse").unwrap();
    client.rename("x", "y").unwrap();

    assert!(!h.root.path().join("x").exists());
    assert!(h.root.path().join("y").exists());

    client.quit().unwrap();
}

#[test]
fn write_is_rejected_for_a_read_only_user() {
    let h = named_user_harness("readonly", "password", false);
    let mut client = FtpStream::connect(&h.addr).unwrap();

    client.login("readonly", "password").unwrap();

    let mut reader = Cursor::new(b"nope".to_vec());
    let result = client.put("nope.txt", &mut reader);
    assert!(result.is_err(), "STOR should be rejected for a read-only user");

    client.quit().unwrap();
}

#[test]
fn rest_then_retr_resumes_from_the_requested_offset() {
    let h = named_user_harness("carol", "letmein", true);
    let payload = b"0123456789abcdefghijklmnopqrstuvwxyz".to_vec();

    let mut client = FtpStream::connect(&h.addr).unwrap();
    client.login("carol", "letmein").unwrap();

    let mut reader = Cursor::new(payload.clone());
    client.put("alphabet.txt", &mut reader).unwrap();

    client.resume_transfer(10).unwrap();
    let mut retrieved = client.simple_retr("alphabet.txt").unwrap();
    let mut out = Vec::new();
    std::io::copy(&mut retrieved, &mut out).unwrap();
    assert_eq!(out, payload[10..]);

    client.quit().unwrap();
}

#[test]
fn abor_with_no_active_transfer_replies_data_connection_closed() {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;

    let h = anonymous_harness();
    let stream = TcpStream::connect(&h.addr).unwrap();
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);

    let mut greeting = String::new();
    reader.read_line(&mut greeting).unwrap();

    writer.write_all(b"USER anonymous\r\n").unwrap();
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    assert!(line.starts_with("230"), "anonymous USER should log in directly, got: {}", line);

    writer.write_all(b"ABOR\r\n").unwrap();
    let mut abor_reply = String::new();
    reader.read_line(&mut abor_reply).unwrap();
    assert!(abor_reply.starts_with("225"), "ABOR with no active transfer should reply 225, got: {}", abor_reply);

    writer.write_all(b"QUIT\r\n").unwrap();
}

#[test]
fn quit_actually_closes_the_control_connection() {
    let h = anonymous_harness();
    let mut client = FtpStream::connect(&h.addr).unwrap();
    client.login("anonymous", "anyone@example.com").unwrap();
    client.quit().unwrap();

    let mut attempts = 0;
    while client.noop().is_ok() {
        assert!(attempts < 100, "timed out waiting for the control connection to close");
        attempts += 1;
        std::thread::sleep(Duration::from_millis(10));
    }
}
