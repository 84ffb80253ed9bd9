//! `wharfftp`: an RFC 959-subset FTP(S) server with an out-of-band manager control
//! endpoint.
//!
//! The [`server`] module holds the control/data channel implementation and
//! [`server::Server`] itself; [`auth`] is the pluggable credential/path-resolution
//! layer; [`manager`] is the local-socket endpoint that drives the server's lifecycle
//! and streams its log.

pub mod auth;
pub mod config;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod server;

pub use server::Server;
