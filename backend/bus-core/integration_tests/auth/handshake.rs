use crate::helpers::{run_handshake, run_handshake_recording_server};

use bus_core::auth::{AuthState, ClientAuthenticator, Mechanism, Mechanisms, ServerAuthenticator};
use bus_core::cookie_store::CookieStore;
use bus_core::error::TransportError;

use std::time::Duration;

use tempfile::TempDir;

const GUID: &str = "5ee1d2b0a6c34b6e9f0f1c2d3e4f5a6b";

// ============================================================================
// Public API tests for the SASL handshake
// Both roles run against each other over a real socket
// ============================================================================

/// **VALUE**: Two peers of the same user authenticate with EXTERNAL.
///
/// **WHY THIS MATTERS**: EXTERNAL is what every local session bus connection
/// uses. If it fails, nothing connects.
///
/// **BUG THIS CATCHES**: Any disagreement between the client's hex-encoded uid
/// and the server's decoding of it.
#[test]
fn given_same_uid_when_handshake_runs_then_both_sides_authenticate_with_external() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store).with_uid(1000);
    let server = ServerAuthenticator::new(&store)
        .with_expected_uid(1000)
        .with_kernel_uid(Some(1000))
        .with_guid(GUID);

    // WHEN
    let (client_result, server_result) = run_handshake(client, server);

    // THEN
    let client_outcome = client_result.unwrap();
    let server_outcome = server_result.unwrap();
    assert!(client_outcome.is_authenticated());
    assert!(server_outcome.is_authenticated());
    assert_eq!(client_outcome.mechanism, Some(Mechanism::External));
    assert_eq!(server_outcome.mechanism, Some(Mechanism::External));
    assert_eq!(client_outcome.guid.as_deref(), Some(GUID));
    assert_eq!(server_outcome.guid.as_deref(), Some(GUID));
}

/// **VALUE**: The cookie mechanism works end to end through a shared keyring.
///
/// **WHY THIS MATTERS**: This is the path for peers that cannot pass
/// credentials over the socket. The server writes a cookie, the client reads
/// it back and both hash the same secret.
///
/// **BUG THIS CATCHES**: A hash input assembled in a different order on each
/// side, or a cookie written after the challenge is sent.
#[test]
fn given_cookie_only_server_when_handshake_runs_then_client_authenticates_with_cookie() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path().join("keyrings"));
    let client = ClientAuthenticator::new(&store)
        .with_uid(1000)
        .with_username("alice");
    let server = ServerAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::COOKIE_SHA1)
        .with_guid(GUID);

    // WHEN
    let (client_result, server_result) = run_handshake(client, server);

    // THEN
    let client_outcome = client_result.unwrap();
    let server_outcome = server_result.unwrap();
    assert_eq!(client_outcome.mechanism, Some(Mechanism::CookieSha1));
    assert_eq!(server_outcome.mechanism, Some(Mechanism::CookieSha1));
    assert!(client_outcome.is_authenticated());
    assert!(server_outcome.is_authenticated());
    assert!(store.keyring_path("org_freedesktop_general").is_file());
}

/// **VALUE**: Against a cookie-only server the client pays exactly one
/// rejection, for its opening bare `AUTH`, before the cookie mechanism
/// succeeds.
///
/// **BUG THIS CATCHES**: A client that tries mechanisms the server never
/// offered, or restarts from the top of its list after a rejection.
#[test]
fn given_cookie_only_server_when_handshake_runs_then_exactly_one_rejection_precedes_ok() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store)
        .with_uid(1000)
        .with_username("alice");
    let server = ServerAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::COOKIE_SHA1)
        .with_guid(GUID);

    // WHEN
    let (client_result, server_result, server_lines) =
        run_handshake_recording_server(client, server);

    // THEN
    assert!(client_result.unwrap().is_authenticated());
    assert!(server_result.unwrap().is_authenticated());
    let rejections: Vec<&str> = server_lines
        .iter()
        .map(String::as_str)
        .filter(|line| line.starts_with("REJECTED"))
        .collect();
    assert_eq!(rejections, vec!["REJECTED DBUS_COOKIE_SHA1"]);
    assert_eq!(server_lines.first().map(String::as_str), Some("REJECTED DBUS_COOKIE_SHA1"));
    assert_eq!(server_lines.last(), Some(&format!("OK {GUID}")));
}

/// **VALUE**: Default authenticators of the same process agree on EXTERNAL.
///
/// **WHY THIS MATTERS**: Both sides read the uid of the running process. If
/// that lookup fails on a platform, EXTERNAL silently disappears.
#[test]
fn given_default_authenticators_when_handshake_runs_then_external_succeeds() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());

    let (client_result, server_result) = run_handshake(
        ClientAuthenticator::new(&store),
        ServerAuthenticator::new(&store),
    );

    assert_eq!(client_result.unwrap().mechanism, Some(Mechanism::External));
    assert_eq!(server_result.unwrap().mechanism, Some(Mechanism::External));
}

#[test]
fn given_custom_cookie_context_when_handshake_runs_then_keyring_uses_that_context() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::COOKIE_SHA1)
        .with_username("alice");
    let server = ServerAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::COOKIE_SHA1)
        .with_cookie_context("org_example_session");

    let (client_result, server_result) = run_handshake(client, server);

    assert!(client_result.unwrap().is_authenticated());
    assert!(server_result.unwrap().is_authenticated());
    assert!(store.keyring_path("org_example_session").is_file());
}

/// **VALUE**: A client whose EXTERNAL attempt is refused moves on to the next
/// mechanism the server offers.
#[test]
fn given_uid_mismatch_when_handshake_runs_then_client_falls_back_to_anonymous() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store).with_uid(1001);
    let server = ServerAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::EXTERNAL | Mechanisms::ANONYMOUS)
        .with_expected_uid(1000);

    let (client_result, server_result) = run_handshake(client, server);

    assert_eq!(client_result.unwrap().mechanism, Some(Mechanism::Anonymous));
    assert_eq!(server_result.unwrap().mechanism, Some(Mechanism::Anonymous));
}

/// **VALUE**: Peers that share no mechanism end without hanging.
///
/// **BUG THIS CATCHES**: A client that keeps waiting after running out of
/// mechanisms blocks the connecting application forever.
#[test]
fn given_no_shared_mechanism_when_handshake_runs_then_client_fails_and_server_sees_eof() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::EXTERNAL)
        .with_uid(1000);
    let server = ServerAuthenticator::new(&store).with_mechanisms(Mechanisms::ANONYMOUS);

    // WHEN
    let (client_result, server_result) = run_handshake(client, server);

    // THEN
    let client_outcome = client_result.unwrap();
    assert_eq!(client_outcome.state, AuthState::Failed);
    assert_eq!(client_outcome.guid, None);
    assert!(matches!(
        server_result,
        Err(TransportError::UnexpectedEof { .. })
    ));
}

#[test]
fn given_kernel_reports_other_uid_when_handshake_runs_then_external_is_refused() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let client = ClientAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::EXTERNAL)
        .with_uid(1000);
    let server = ServerAuthenticator::new(&store)
        .with_mechanisms(Mechanisms::EXTERNAL)
        .with_expected_uid(1000)
        .with_kernel_uid(Some(0));

    let (client_result, server_result) = run_handshake(client, server);

    assert!(!client_result.unwrap().is_authenticated());
    assert!(server_result.is_err());
}

/// **VALUE**: A client that cannot read the server's keyring fails the cookie
/// mechanism instead of hanging.
///
/// **WHY THIS MATTERS**: Client and server of different users see different
/// home directories. The client must report the missing cookie so the server
/// rejects the attempt.
#[test]
fn given_separate_keyrings_when_cookie_handshake_runs_then_client_fails() {
    // GIVEN
    let server_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();
    let server_store = CookieStore::new(server_dir.path());
    let client_store = CookieStore::new(client_dir.path());
    let client = ClientAuthenticator::new(&client_store)
        .with_username("alice")
        .with_lookup_timeout(Duration::from_millis(20));
    let server = ServerAuthenticator::new(&server_store).with_mechanisms(Mechanisms::COOKIE_SHA1);

    // WHEN
    let (client_result, server_result) = run_handshake(client, server);

    // THEN
    assert_eq!(client_result.unwrap().state, AuthState::Failed);
    assert!(matches!(
        server_result,
        Err(TransportError::UnexpectedEof { .. })
    ));
}
