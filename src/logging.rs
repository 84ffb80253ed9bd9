//! Process-wide logging: records go to stderr exactly as `pretty_env_logger` would
//! format them, and a copy of each formatted line is fanned out to whichever manager
//! connection has subscribed via `LOGOUTPUT`.
//!
//! Replaces a singleton logger with an explicitly owned sink: this module installs
//! one process-wide `log::Log` facade at startup, but the sink it forwards into
//! (`LogSink`) is a plain value any caller can hold a handle to.

use chrono::Local;
use lazy_static::lazy_static;
use log::{LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Lines buffered past this count before a lagging subscriber starts dropping the
/// oldest ones (`tokio::sync::broadcast`'s own overflow behaviour).
const LOG_QUEUE_CAPACITY: usize = 1024;

lazy_static! {
    static ref SINK: LogSink = LogSink::new();
}

/// A multi-producer, effectively-single-consumer fan-out of formatted log lines.
/// Cloning shares the same channel; a lagging subscriber silently drops the oldest
/// buffered lines rather than blocking producers. Lines are held in `pending` until
/// the flush task drains them, so a burst of log calls between two flush ticks
/// reaches subscribers as one batch rather than one broadcast send per line.
#[derive(Clone)]
pub struct LogSink {
    tx: broadcast::Sender<String>,
    pending: std::sync::Arc<Mutex<Vec<String>>>,
}

impl LogSink {
    fn new() -> Self {
        let (tx, _rx) = broadcast::channel(LOG_QUEUE_CAPACITY);
        LogSink {
            tx,
            pending: std::sync::Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn enqueue(&self, line: String) {
        self.pending.lock().unwrap().push(line);
    }

    fn flush(&self) {
        let lines = std::mem::take(&mut *self.pending.lock().unwrap());
        for line in lines {
            // No subscribers is the common case; a send error there is not a failure.
            let _ = self.tx.send(line);
        }
    }

    /// A fresh receiver over this sink, for the manager's `LOGOUTPUT` stream.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

/// The global sink every `log::info!`/`warn!`/etc. call is fanned out through.
pub fn sink() -> LogSink {
    SINK.clone()
}

struct GlobalLogger {
    level: LevelFilter,
}

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{} {:<5} {}: {}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"), record.level(), record.target(), record.args());
        eprintln!("{}", line);
        SINK.enqueue(line);
    }

    fn flush(&self) {
        SINK.flush();
    }
}

/// Installs the global logger and spawns its flush task. Call once, at process
/// startup, from within a running Tokio runtime. `level` mirrors the `RUST_LOG`-style
/// filter `pretty_env_logger` would otherwise read from the environment; `flush_ms` is
/// [`crate::config::ServerConfig::log_flush_ms`] — both are typically passed straight
/// from the loaded config.
pub fn init(level: LevelFilter, flush_ms: u64) -> Result<(), log::SetLoggerError> {
    static INSTALLED: Mutex<bool> = Mutex::new(false);
    let mut installed = INSTALLED.lock().unwrap();
    if *installed {
        return Ok(());
    }
    log::set_boxed_logger(Box::new(GlobalLogger { level }))?;
    log::set_max_level(level);
    *installed = true;
    drop(installed);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(flush_ms.max(1)));
        loop {
            ticker.tick().await;
            SINK.flush();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_moves_pending_lines_onto_the_broadcast_channel() {
        let sink = LogSink::new();
        let mut rx = sink.subscribe();
        sink.enqueue("hello".to_string());
        assert!(rx.try_recv().is_err(), "line should not be visible before a flush");
        sink.flush();
        assert_eq!(rx.try_recv().unwrap(), "hello");
    }
}
