//! A `tokio_util::codec::{Decoder,Encoder}` pair that frames the control channel TCP
//! stream into [`Command`]s in and [`Reply`]s out.

use super::command::Command;
use super::error::ControlChanError;
use super::reply::Reply;
use bytes::{Buf, BufMut, BytesMut};
use std::convert::TryFrom;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum accepted command line length: lines longer than this are a protocol error
/// rather than silently truncated.
const MAX_LINE_LEN: usize = 4096;

/// Telnet `IAC IP IAC DM` (Interrupt Process, Data Mark), the out-of-band abort signal
/// some clients splice into the control stream ahead of `ABOR`.
const TELNET_ABORT_SEQUENCE: [u8; 4] = [0xFF, 0xF4, 0xFF, 0xF2];

#[derive(Default)]
pub struct FTPCodec {
    next_index: usize,
}

impl FTPCodec {
    pub fn new() -> Self {
        FTPCodec { next_index: 0 }
    }
}

impl Decoder for FTPCodec {
    type Item = Command;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Command>, ControlChanError> {
        if let Some(pos) = buf.windows(TELNET_ABORT_SEQUENCE.len()).position(|w| w == TELNET_ABORT_SEQUENCE) {
            let mut prefix = buf.split_to(pos);
            buf.advance(TELNET_ABORT_SEQUENCE.len());
            let rest = buf.split_to(buf.len());
            prefix.unsplit(rest);
            *buf = prefix;
            self.next_index = 0;
            return Ok(Some(Command::TelnetAbort));
        }
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = self.next_index + newline_offset;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            let command = Command::try_from(&line[..line.len() - if line.ends_with(b"\r\n") { 2 } else { 1 }])?;
            Ok(Some(command))
        } else {
            self.next_index = buf.len();
            if self.next_index > MAX_LINE_LEN {
                Err(super::parse_error::ParseError::LineTooLong.into())
            } else {
                Ok(None)
            }
        }
    }
}

impl Encoder for FTPCodec {
    type Item = Reply;
    type Error = ControlChanError;

    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), ControlChanError> {
        if let Some(wire) = reply.to_wire_string() {
            buf.reserve(wire.len());
            buf.put(wire.as_bytes());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_simple_command() {
        let mut codec = FTPCodec::new();
        let mut buf = BytesMut::from(&b"NOOP\r\n"[..]);
        let cmd = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(cmd, Command::Noop);
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_a_full_line() {
        let mut codec = FTPCodec::new();
        let mut buf = BytesMut::from(&b"NOO"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decodes_a_telnet_abort_sequence_ahead_of_the_next_command() {
        let mut codec = FTPCodec::new();
        let mut buf = BytesMut::from(&b"\xFF\xF4\xFF\xF2NOOP\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), Command::TelnetAbort);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), Command::Noop);
    }

    #[test]
    fn encodes_a_reply() {
        use super::super::reply::ReplyCode;
        let mut codec = FTPCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Reply::new(ReplyCode::CommandOkay, "OK"), &mut buf).unwrap();
        assert_eq!(&buf[..], b"200 OK\r\n");
    }
}
