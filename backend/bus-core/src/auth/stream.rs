use crate::auth::command::Command;
use crate::error::TransportError;

use common::ErrorLocation;

use std::io::{ErrorKind, Read, Write};
use std::panic::Location;

use log::trace;

/// Longest line accepted from a peer, in bytes.
pub const MAX_LINE_LENGTH: usize = 16 * 1024;

const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Line framing over a blocking byte stream.
///
/// Reads one byte at a time so nothing past the handshake is consumed.
pub(crate) struct LineStream<'s, S> {
    inner: &'s mut S,
}

impl<'s, S: Read + Write> LineStream<'s, S> {
    pub(crate) fn new(inner: &'s mut S) -> Self {
        Self { inner }
    }

    #[track_caller]
    pub(crate) fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    return Err(TransportError::UnexpectedEof {
                        message: String::from("Stream closed during the handshake"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::from(e)),
            }
        }
    }

    #[track_caller]
    pub(crate) fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.inner.write_all(&[byte])?;
        self.inner.flush()?;
        Ok(())
    }

    /// Read up to the next `\n`. Carriage returns and NUL bytes are dropped.
    #[track_caller]
    pub(crate) fn read_line(&mut self) -> Result<String, TransportError> {
        let mut line = Vec::new();
        loop {
            match self.read_byte()? {
                b'\n' => break,
                b'\r' | 0 => {}
                byte => {
                    if line.len() >= MAX_LINE_LENGTH {
                        return Err(TransportError::LineTooLong {
                            limit: MAX_LINE_LENGTH,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                    line.push(byte);
                }
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    #[track_caller]
    pub(crate) fn receive(&mut self) -> Result<Command, TransportError> {
        let command = Command::parse(&self.read_line()?);
        trace!("SASL <- {}", command.redacted());
        Ok(command)
    }

    #[track_caller]
    pub(crate) fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        trace!("SASL -> {}", command.redacted());
        self.inner.write_all(command.to_string().as_bytes())?;
        self.inner.write_all(LINE_TERMINATOR)?;
        self.inner.flush()?;
        Ok(())
    }
}
