use crate::cookie_store::{CookieStore, now_seconds, validate_context};
use crate::error::CookieError;

use common::RedactedSecret;
use models::Cookie;

use std::fs;
use std::time::{Duration, Instant};

use tempfile::TempDir;

const CONTEXT: &str = "org_freedesktop_general";

fn cookie(id: &str, created_at_seconds: i64, secret: &str) -> Cookie {
    Cookie::new(CONTEXT, id, created_at_seconds, RedactedSecret::new(secret))
}

/// **VALUE**: A cookie written by the server can be found by the client.
///
/// **WHY THIS MATTERS**: This is the whole point of the keyring: the client
/// proves identity by reading a file only its user can read.
#[test]
fn given_appended_cookie_when_looked_up_then_found_with_secret() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path().join("keyrings"));
    let now = now_seconds();

    // WHEN
    store.append(&cookie("1001", now, "c0ffee")).unwrap();
    let found = store.lookup(CONTEXT, "1001").unwrap();

    // THEN
    let found = found.expect("cookie should be found");
    assert_eq!(found.id, "1001");
    assert_eq!(found.secret.expose(), "c0ffee");
    assert!(store.keyring_path(CONTEXT).is_file());
}

#[test]
fn given_missing_keyring_when_looked_up_then_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());

    assert!(store.lookup(CONTEXT, "42").unwrap().is_none());
}

#[cfg(unix)]
#[test]
fn given_new_keyring_directory_when_cookie_appended_then_directory_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let keyrings = dir.path().join("keyrings");
    let store = CookieStore::new(&keyrings);

    store.append(&cookie("1", now_seconds(), "aa")).unwrap();

    let mode = fs::metadata(&keyrings).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

/// **VALUE**: Cookies outside the validity window are never handed out.
///
/// **BUG THIS CATCHES**: Accepting an expired cookie lets a leaked keyring
/// line authenticate long after the server stopped trusting it.
#[test]
fn given_cookies_outside_window_when_looked_up_then_not_found() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let now = now_seconds();
    fs::write(
        store.keyring_path(CONTEXT),
        format!(
            "old {} aa\nfuture {} bb\nnegative -5 cc\nfresh {} dd\n",
            now - 3600,
            now + 3600,
            now - 10
        ),
    )
    .unwrap();

    // WHEN / THEN
    assert!(store.lookup(CONTEXT, "old").unwrap().is_none());
    assert!(store.lookup(CONTEXT, "future").unwrap().is_none());
    assert!(store.lookup(CONTEXT, "negative").unwrap().is_none());
    assert!(store.lookup(CONTEXT, "fresh").unwrap().is_some());
}

/// **VALUE**: One corrupt line does not take the whole keyring down.
#[test]
fn given_malformed_lines_when_looked_up_then_valid_entries_still_found() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let now = now_seconds();
    fs::write(
        store.keyring_path(CONTEXT),
        format!("garbage\n7 notanumber ff\n\n8 {now} ee\n9 {now}\n"),
    )
    .unwrap();

    let found = store.lookup(CONTEXT, "8").unwrap();

    assert_eq!(found.unwrap().secret.expose(), "ee");
    assert!(store.lookup(CONTEXT, "9").unwrap().is_none());
}

/// **VALUE**: Appending drops entries older than the prune window.
///
/// **WHY THIS MATTERS**: Every server handshake adds a line; without pruning
/// the keyring grows without bound.
#[test]
fn given_stale_entries_when_new_cookie_appended_then_stale_entries_are_pruned() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let now = now_seconds();
    fs::write(
        store.keyring_path(CONTEXT),
        format!("stale {} aa\nrecent {} bb\n", now - 1000, now - 60),
    )
    .unwrap();

    // WHEN
    store.append(&cookie("new", now, "cc")).unwrap();

    // THEN
    let contents = fs::read_to_string(store.keyring_path(CONTEXT)).unwrap();
    let ids: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(ids, vec!["recent", "new"]);
}

#[test]
fn given_successful_append_when_finished_then_lock_file_is_released() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());

    store.append(&cookie("1", now_seconds(), "aa")).unwrap();

    assert!(!dir.path().join(format!("{CONTEXT}.lock")).exists());
}

/// **VALUE**: A lock left behind by a crashed writer delays but never blocks
/// authentication.
#[test]
fn given_stale_lock_when_cookie_appended_then_write_proceeds_after_timeout() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path()).with_lock_timeout(Duration::from_millis(50));
    let lock = dir.path().join(format!("{CONTEXT}.lock"));
    fs::write(&lock, "").unwrap();

    // WHEN
    let result = store.append(&cookie("1", now_seconds(), "aa"));

    // THEN
    assert!(result.is_ok());
    assert!(store.lookup(CONTEXT, "1").unwrap().is_some());
    assert!(lock.exists(), "a lock we never took must not be removed");
}

#[test]
fn given_absent_cookie_when_looked_up_with_retry_then_gives_up_after_timeout() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());
    let started = Instant::now();

    let found = store
        .lookup_with_retry(CONTEXT, "missing", Duration::from_millis(60))
        .unwrap();

    assert!(found.is_none());
    assert!(started.elapsed() >= Duration::from_millis(50));
}

/// **VALUE**: Context names that could escape the keyring directory are refused.
///
/// **BUG THIS CATCHES**: A hostile server sending `../../.ssh/authorized_keys`
/// as a context would make the client read arbitrary files.
#[test]
fn given_unsafe_contexts_when_validated_then_rejected() {
    for context in ["", "../escape", "a/b", "a\\b", ".hidden", "with space", "tab\tname"] {
        assert!(
            matches!(
                validate_context(context),
                Err(CookieError::InvalidContext { .. })
            ),
            "'{context}' should be rejected"
        );
    }
    assert!(validate_context(CONTEXT).is_ok());
}

#[test]
fn given_unsafe_context_when_looked_up_then_returns_invalid_context() {
    let dir = TempDir::new().unwrap();
    let store = CookieStore::new(dir.path());

    let result = store.lookup("../etc", "1");

    assert!(matches!(result, Err(CookieError::InvalidContext { .. })));
}
