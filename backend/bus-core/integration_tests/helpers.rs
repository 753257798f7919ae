//! Test helpers for handshake integration tests.
//!
//! Client and server run on two threads joined by a connected socket pair.
//! Each side drops its end when done, so a peer that gives up shows up on the
//! other side as end of stream rather than a hang.

use bus_core::auth::{AuthOutcome, ClientAuthenticator, ServerAuthenticator};
use bus_core::error::TransportError;

use std::io::{Read, Result as IoResult, Write};
use std::os::unix::net::UnixStream;
use std::thread;

pub type HandshakeResult = Result<AuthOutcome, TransportError>;

/// Stream that keeps a copy of everything written through it.
struct Recorded<S> {
    inner: S,
    written: Vec<u8>,
}

impl<S: Read> Read for Recorded<S> {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.inner.read(buf)
    }
}

impl<S: Write> Write for Recorded<S> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        let written = self.inner.write(buf)?;
        self.written.extend_from_slice(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.inner.flush()
    }
}

/// Run both roles to completion and return (client, server) results.
pub fn run_handshake(
    client: ClientAuthenticator<'_>,
    server: ServerAuthenticator<'_>,
) -> (HandshakeResult, HandshakeResult) {
    let (client_outcome, server_outcome, _) = run_handshake_recording_server(client, server);
    (client_outcome, server_outcome)
}

/// Like [`run_handshake`], also returning the lines the server sent.
pub fn run_handshake_recording_server(
    client: ClientAuthenticator<'_>,
    server: ServerAuthenticator<'_>,
) -> (HandshakeResult, HandshakeResult, Vec<String>) {
    let (mut client_end, server_end) = UnixStream::pair().expect("Failed to create socket pair");

    thread::scope(|scope| {
        let server_thread = scope.spawn(move || {
            let mut recorded = Recorded {
                inner: server_end,
                written: Vec::new(),
            };
            let outcome = server.authenticate(&mut recorded);
            let Recorded { inner, written } = recorded;
            drop(inner);
            (outcome, written)
        });

        let client_outcome = client.authenticate(&mut client_end);
        drop(client_end);

        let (server_outcome, written) = server_thread.join().expect("Server thread panicked");
        let lines = String::from_utf8_lossy(&written)
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        (client_outcome, server_outcome, lines)
    })
}
