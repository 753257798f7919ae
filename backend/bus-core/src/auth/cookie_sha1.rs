//! `DBUS_COOKIE_SHA1` challenge and response.
//!
//! Server sends `context id server_challenge`; the client proves it can read
//! the cookie by answering `client_challenge sha1(server:client:secret)`.
//! Every payload travels hex-encoded.

use crate::cookie_store::{self, CookieStore};
use crate::error::AuthError;

use common::RedactedSecret;
use models::Cookie;

use std::time::Duration;

use log::debug;
use rand::RngCore;
use sha1::{Digest, Sha1};

const RANDOM_BYTES: usize = 32;

fn sha1_hex(input: &[u8]) -> String {
    hex::encode(Sha1::digest(input))
}

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    sha1_hex(&bytes)
}

fn decode_text(payload: &str) -> Result<String, AuthError> {
    Ok(String::from_utf8(hex::decode(payload)?)?)
}

/// Initial response of the client: its user name.
pub(crate) fn client_initial_response(username: &str) -> String {
    hex::encode(username)
}

/// Answer the server challenge carried in a `DATA` payload.
pub(crate) fn client_response(
    store: &CookieStore,
    payload: &str,
    lookup_timeout: Duration,
) -> Result<String, AuthError> {
    let text = decode_text(payload)?;
    let parts: Vec<&str> = text.split(' ').collect();
    let [context, id, server_challenge] = parts.as_slice() else {
        return Err(AuthError::challenge(format!(
            "Expected 'context id challenge', got {} fields",
            parts.len()
        )));
    };

    cookie_store::validate_context(context)?;
    debug!("Cookie challenge for id {id} in context {context}");

    let cookie = store
        .lookup_with_retry(context, id, lookup_timeout)?
        .ok_or_else(|| AuthError::cookie_not_found(*context, *id))?;

    let client_challenge = sha1_hex(&cookie_store::now_millis().to_be_bytes());
    let hash = sha1_hex(
        format!(
            "{server_challenge}:{client_challenge}:{}",
            cookie.secret.expose()
        )
        .as_bytes(),
    );

    Ok(hex::encode(format!("{client_challenge} {hash}")))
}

/// Server half of one cookie exchange.
#[derive(Debug)]
pub(crate) struct ServerChallenge {
    challenge: String,
    secret: RedactedSecret,
}

impl ServerChallenge {
    /// Mint a cookie, store it and build the `DATA` payload announcing it.
    pub(crate) fn issue(store: &CookieStore, context: &str) -> Result<(Self, String), AuthError> {
        let now_ms = cookie_store::now_millis();
        let id = now_ms.to_string();
        let secret = RedactedSecret::new(random_token());
        let challenge = random_token();

        store.append(&Cookie::new(context, id.clone(), now_ms / 1000, secret.clone()))?;
        debug!("Issued cookie {id} in context {context}");

        let payload = hex::encode(format!("{context} {id} {challenge}"));
        Ok((Self { challenge, secret }, payload))
    }

    /// Check the client's `DATA` payload against the issued cookie.
    pub(crate) fn verify(&self, payload: &str) -> Result<(), AuthError> {
        let text = decode_text(payload)?;
        let Some((client_challenge, hash)) = text.split_once(' ') else {
            return Err(AuthError::decode("Expected 'challenge hash' in client response"));
        };

        let expected = RedactedSecret::new(sha1_hex(
            format!(
                "{}:{client_challenge}:{}",
                self.challenge,
                self.secret.expose()
            )
            .as_bytes(),
        ));

        if expected.matches(hash) {
            Ok(())
        } else {
            Err(AuthError::hash_mismatch())
        }
    }
}
