//! Messages passed between the data channel, the manager, and a session's control
//! channel event loop. The control loop selects on this `InternalMsg` stream alongside
//! the parsed command stream.

use futures::channel::mpsc::{Receiver, Sender};

/// Events the data channel (or other session-internal machinery) raises back onto the
/// control channel's event loop, which turns each into a [`Reply`](super::controlchan::Reply).
#[derive(Debug)]
pub enum InternalMsg {
    /// Requested file does not exist (RETR/STOR/APPE couldn't open it).
    NotFound,
    /// A RETR transfer is about to start sending bytes.
    SendingData,
    /// A RETR transfer finished successfully; carries the byte count sent.
    SendData { bytes: u64 },
    /// A STOR/STOU/APPE write failed partway through.
    WriteFailed,
    /// The data connection was reset by the peer mid-transfer.
    ConnectionReset,
    /// A STOR/STOU/APPE transfer finished successfully; carries the byte count written.
    WrittenData { bytes: u64 },
    /// LIST/NLST/MLSD finished streaming the listing.
    DirectorySuccessfullyListed,
    /// The control channel should close immediately (QUIT, or KILL from the manager).
    Quit,
    /// AUTH TLS succeeded; the control channel should re-wrap itself in TLS.
    SecureControlChannel,
}

/// Per-session sender half used by the data channel / abort task to signal back to
/// the control loop.
pub type ControlMsgSender = Sender<InternalMsg>;
/// Per-session receiver half the control loop selects on.
pub type ControlMsgReceiver = Receiver<InternalMsg>;
