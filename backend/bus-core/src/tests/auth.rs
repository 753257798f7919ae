// Handshake state machines driven by scripted peers.
// Each script is everything the peer would send; the output is checked line by line.

use crate::auth::{
    AuthRole, AuthState, ClientAuthenticator, MAX_LINE_LENGTH, Mechanism, Mechanisms,
    ServerAuthenticator,
};
use crate::cookie_store::CookieStore;
use crate::error::TransportError;
use crate::DEFAULT_COOKIE_CONTEXT;

use std::io::{Cursor, Read, Result as IoResult, Write};
use std::time::Duration;

use tempfile::TempDir;

const GUID: &str = "0123456789abcdef0123456789abcdef";
const UID_1000_HEX: &str = "31303030";

struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl ScriptedStream {
    fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            input: Cursor::new(script.into()),
            output: Vec::new(),
        }
    }

    fn written(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

fn server(store: &CookieStore) -> ServerAuthenticator<'_> {
    ServerAuthenticator::new(store)
        .with_guid(GUID)
        .with_expected_uid(1000)
}

// ============================================
// SERVER
// ============================================

#[test]
fn given_anonymous_client_when_server_authenticates_then_accepts_after_begin() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0AUTH ANONYMOUS\r\nBEGIN\r\n");

    // WHEN
    let outcome = server(&store).authenticate(&mut stream).unwrap();

    // THEN
    assert!(outcome.is_authenticated());
    assert_eq!(outcome.role, AuthRole::Server);
    assert_eq!(outcome.mechanism, Some(Mechanism::Anonymous));
    assert_eq!(outcome.guid.as_deref(), Some(GUID));
    assert_eq!(stream.written(), format!("OK {GUID}\r\n"));
}

/// **VALUE**: A bare `AUTH` is answered with the mechanism list.
///
/// **WHY THIS MATTERS**: Clients open with a bare `AUTH` to discover what the
/// server supports; no answer means the handshake hangs forever.
#[test]
fn given_bare_auth_when_server_authenticates_then_lists_mechanisms_in_preference_order() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0AUTH\r\nAUTH ANONYMOUS\r\nBEGIN\r\n");

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(
        stream.written(),
        format!("REJECTED EXTERNAL DBUS_COOKIE_SHA1 ANONYMOUS\r\nOK {GUID}\r\n")
    );
}

#[test]
fn given_matching_uid_when_external_requested_then_server_accepts() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(format!("\0AUTH EXTERNAL {UID_1000_HEX}\r\nBEGIN\r\n"));

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert_eq!(outcome.mechanism, Some(Mechanism::External));
    assert_eq!(stream.written(), format!("OK {GUID}\r\n"));
}

#[test]
fn given_external_without_initial_response_when_authenticating_then_server_asks_for_data() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream =
        ScriptedStream::new(format!("\0AUTH EXTERNAL\r\nDATA {UID_1000_HEX}\r\nBEGIN\r\n"));

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(stream.written(), format!("DATA\r\nOK {GUID}\r\n"));
}

/// **VALUE**: A client claiming someone else's uid is rejected.
///
/// **BUG THIS CATCHES**: Accepting any well-formed uid would let every local
/// user connect as every other.
#[test]
fn given_wrong_uid_when_external_requested_then_server_rejects_and_waits_for_retry() {
    // GIVEN: uid 1001 claimed, 1000 expected
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0AUTH EXTERNAL 31303031\r\nAUTH ANONYMOUS\r\nBEGIN\r\n");

    // WHEN
    let outcome = server(&store)
        .with_mechanisms(Mechanisms::EXTERNAL | Mechanisms::ANONYMOUS)
        .authenticate(&mut stream)
        .unwrap();

    // THEN
    assert_eq!(outcome.mechanism, Some(Mechanism::Anonymous));
    assert_eq!(
        stream.written(),
        format!("REJECTED EXTERNAL ANONYMOUS\r\nOK {GUID}\r\n")
    );
}

#[test]
fn given_kernel_uid_differs_when_external_requested_then_server_rejects() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(format!("\0AUTH EXTERNAL {UID_1000_HEX}\r\n"));

    let result = server(&store)
        .with_kernel_uid(Some(0))
        .with_mechanisms(Mechanisms::EXTERNAL)
        .authenticate(&mut stream);

    assert!(matches!(result, Err(TransportError::UnexpectedEof { .. })));
    assert_eq!(stream.written(), "REJECTED EXTERNAL\r\n");
}

#[test]
fn given_disabled_or_unknown_mechanism_when_requested_then_server_rejects() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream =
        ScriptedStream::new("\0AUTH ANONYMOUS\r\nAUTH KERBEROS_V4 00\r\nAUTH EXTERNAL 31303030\r\nBEGIN\r\n");

    let outcome = server(&store)
        .with_mechanisms(Mechanisms::EXTERNAL)
        .authenticate(&mut stream)
        .unwrap();

    assert_eq!(outcome.mechanism, Some(Mechanism::External));
    assert_eq!(
        stream.written(),
        format!("REJECTED EXTERNAL\r\nREJECTED EXTERNAL\r\nOK {GUID}\r\n")
    );
}

/// **VALUE**: The cookie mechanism stores a fresh cookie before challenging.
///
/// **WHY THIS MATTERS**: The client reads the cookie named in the challenge
/// from the keyring; announcing an id that was never written can not succeed.
#[test]
fn given_cookie_mechanism_when_requested_then_server_stores_cookie_and_sends_challenge() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0AUTH DBUS_COOKIE_SHA1 616c696365\r\nDATA 6869\r\n");

    // WHEN
    let result = server(&store).authenticate(&mut stream);

    // THEN: the bogus answer is rejected, then the script runs dry
    assert!(matches!(result, Err(TransportError::UnexpectedEof { .. })));
    let written = stream.written();
    let mut lines = written.lines();
    let challenge = lines
        .next()
        .and_then(|line| line.strip_prefix("DATA "))
        .expect("server should send a challenge");
    let challenge = String::from_utf8(hex::decode(challenge).unwrap()).unwrap();
    let fields: Vec<&str> = challenge.split(' ').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0], DEFAULT_COOKIE_CONTEXT);
    assert!(store.lookup(fields[0], fields[1]).unwrap().is_some());
    assert_eq!(
        lines.next(),
        Some("REJECTED EXTERNAL DBUS_COOKIE_SHA1 ANONYMOUS")
    );
}

#[test]
fn given_cancel_during_exchange_when_server_authenticates_then_rejects() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0AUTH EXTERNAL\r\nCANCEL\r\nAUTH ANONYMOUS\r\nBEGIN\r\n");

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(
        stream.written(),
        format!("DATA\r\nREJECTED EXTERNAL DBUS_COOKIE_SHA1 ANONYMOUS\r\nOK {GUID}\r\n")
    );
}

#[test]
fn given_unexpected_command_when_server_waits_for_auth_then_replies_error() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0DATA 00\r\nHELLO\r\nAUTH ANONYMOUS\r\nBEGIN\r\n");

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(
        stream.written(),
        format!("ERROR Got invalid command\r\nERROR Got invalid command\r\nOK {GUID}\r\n")
    );
}

#[test]
fn given_begin_before_ok_when_server_authenticates_then_fails() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("\0BEGIN\r\n");

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert_eq!(outcome.state, AuthState::Failed);
    assert_eq!(outcome.guid, None);
    assert!(stream.written().is_empty());
}

/// **VALUE**: The credential byte must be NUL.
#[test]
fn given_nonzero_credential_byte_when_server_authenticates_then_fails_without_reply() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("XAUTH ANONYMOUS\r\n");

    let outcome = server(&store).authenticate(&mut stream).unwrap();

    assert!(!outcome.is_authenticated());
    assert!(stream.written().is_empty());
}

/// **BUG THIS CATCHES**: Buffering an endless line lets a peer exhaust memory
/// before authenticating.
#[test]
fn given_line_longer_than_limit_when_received_then_returns_line_too_long() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut script = vec![0u8];
    script.extend(std::iter::repeat_n(b'A', MAX_LINE_LENGTH + 1));
    script.extend_from_slice(b"\r\n");
    let mut stream = ScriptedStream::new(script);

    let result = server(&store).authenticate(&mut stream);

    assert!(matches!(result, Err(TransportError::LineTooLong { .. })));
}

#[test]
fn given_stream_closed_before_credential_byte_when_server_authenticates_then_returns_eof() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(Vec::new());

    let result = server(&store).authenticate(&mut stream);

    assert!(matches!(result, Err(TransportError::UnexpectedEof { .. })));
}

// ============================================
// CLIENT
// ============================================

#[test]
fn given_server_offers_external_when_client_authenticates_then_uses_external() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(format!("REJECTED EXTERNAL ANONYMOUS\r\nOK {GUID}\r\n"));

    // WHEN
    let outcome = ClientAuthenticator::new(&store)
        .with_uid(1000)
        .authenticate(&mut stream)
        .unwrap();

    // THEN
    assert!(outcome.is_authenticated());
    assert_eq!(outcome.role, AuthRole::Client);
    assert_eq!(outcome.mechanism, Some(Mechanism::External));
    assert_eq!(outcome.guid.as_deref(), Some(GUID));
    assert_eq!(
        stream.written(),
        format!("\0AUTH\r\nAUTH EXTERNAL {UID_1000_HEX}\r\nBEGIN\r\n")
    );
}

/// **VALUE**: A rejected mechanism is never retried; the next one is.
///
/// **BUG THIS CATCHES**: Retrying EXTERNAL after each REJECTED loops forever
/// against a server that only accepts ANONYMOUS.
#[test]
fn given_rejection_when_client_authenticates_then_falls_back_to_next_mechanism() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(format!(
        "REJECTED EXTERNAL ANONYMOUS\r\nREJECTED EXTERNAL ANONYMOUS\r\nOK {GUID}\r\n"
    ));

    let outcome = ClientAuthenticator::new(&store)
        .with_uid(1000)
        .authenticate(&mut stream)
        .unwrap();

    assert_eq!(outcome.mechanism, Some(Mechanism::Anonymous));
    assert_eq!(
        stream.written(),
        format!("\0AUTH\r\nAUTH EXTERNAL {UID_1000_HEX}\r\nAUTH ANONYMOUS\r\nBEGIN\r\n")
    );
}

#[test]
fn given_no_common_mechanism_when_client_authenticates_then_fails() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("REJECTED KERBEROS_V4\r\n");

    let outcome = ClientAuthenticator::new(&store)
        .authenticate(&mut stream)
        .unwrap();

    assert_eq!(outcome.state, AuthState::Failed);
    assert_eq!(stream.written(), "\0AUTH\r\n");
}

#[test]
fn given_data_challenge_when_anonymous_in_progress_then_client_answers_empty_data() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new(format!("REJECTED ANONYMOUS\r\nDATA\r\nOK {GUID}\r\n"));

    let outcome = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::ANONYMOUS)
        .authenticate(&mut stream)
        .unwrap();

    assert!(outcome.is_authenticated());
    assert_eq!(
        stream.written(),
        "\0AUTH\r\nAUTH ANONYMOUS\r\nDATA\r\nBEGIN\r\n"
    );
}

/// **VALUE**: A server error after our response cancels the attempt.
#[test]
fn given_error_while_waiting_for_ok_when_client_authenticates_then_cancels() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream =
        ScriptedStream::new("REJECTED ANONYMOUS\r\nDATA\r\nERROR\r\nREJECTED ANONYMOUS\r\n");

    let outcome = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::ANONYMOUS)
        .authenticate(&mut stream)
        .unwrap();

    assert_eq!(outcome.state, AuthState::Failed);
    assert_eq!(
        stream.written(),
        "\0AUTH\r\nAUTH ANONYMOUS\r\nDATA\r\nCANCEL\r\n"
    );
}

#[test]
fn given_non_rejected_reply_after_cancel_when_client_authenticates_then_fails() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream =
        ScriptedStream::new(format!("REJECTED ANONYMOUS\r\nERROR\r\nOK {GUID}\r\n"));

    let outcome = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::ANONYMOUS)
        .authenticate(&mut stream)
        .unwrap();

    assert_eq!(outcome.state, AuthState::Failed);
    assert_eq!(stream.written(), "\0AUTH\r\nAUTH ANONYMOUS\r\nCANCEL\r\n");
}

/// **VALUE**: A missing cookie is reported to the server, not treated as fatal.
///
/// **WHY THIS MATTERS**: The server answers the `ERROR` with `REJECTED`, which
/// lets the client move on to another mechanism.
#[test]
fn given_unknown_cookie_when_client_answers_challenge_then_sends_error_and_falls_back() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let challenge = hex::encode(format!("{DEFAULT_COOKIE_CONTEXT} 999 abcdef"));
    let mut stream = ScriptedStream::new(format!(
        "REJECTED DBUS_COOKIE_SHA1 ANONYMOUS\r\nDATA {challenge}\r\nREJECTED DBUS_COOKIE_SHA1 ANONYMOUS\r\nOK {GUID}\r\n"
    ));

    // WHEN
    let outcome = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::COOKIE_SHA1 | Mechanisms::ANONYMOUS)
        .with_username("alice")
        .with_lookup_timeout(Duration::from_millis(10))
        .authenticate(&mut stream)
        .unwrap();

    // THEN
    assert_eq!(outcome.mechanism, Some(Mechanism::Anonymous));
    assert_eq!(
        stream.written(),
        "\0AUTH\r\nAUTH DBUS_COOKIE_SHA1 616c696365\r\nERROR Challenge failed\r\nAUTH ANONYMOUS\r\nBEGIN\r\n"
    );
}

#[test]
fn given_server_closes_stream_when_client_authenticates_then_returns_eof() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let mut stream = ScriptedStream::new("REJECTED ANONYMOUS\r\n");

    let result = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::ANONYMOUS)
        .authenticate(&mut stream);

    assert!(matches!(result, Err(TransportError::UnexpectedEof { .. })));
}
