use crate::auth::command::Command;
use crate::auth::cookie_sha1;
use crate::auth::credentials::{current_uid, current_username};
use crate::auth::mechanism::{Mechanism, Mechanisms};
use crate::auth::stream::LineStream;
use crate::auth::{AuthOutcome, AuthRole, AuthState};
use crate::config::AuthConfig;
use crate::cookie_store::CookieStore;
use crate::error::{AuthError, TransportError};

use std::io::{Read, Write};
use std::time::Duration;

use log::{debug, info, warn};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(1000);
const INVALID_COMMAND_MESSAGE: &str = "Got invalid command";

/// Client role of the handshake.
pub struct ClientAuthenticator<'a> {
    mechanisms: Mechanisms,
    uid: Option<u32>,
    username: String,
    cookie_store: &'a CookieStore,
    lookup_timeout: Duration,
}

/// Mechanism bookkeeping across rejections.
#[derive(Default)]
struct Negotiation {
    current: Option<Mechanism>,
    failed: Mechanisms,
}

impl<'a> ClientAuthenticator<'a> {
    pub fn new(cookie_store: &'a CookieStore) -> Self {
        Self {
            mechanisms: Mechanisms::all(),
            uid: current_uid(),
            username: current_username(),
            cookie_store,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn from_config(config: &AuthConfig, cookie_store: &'a CookieStore) -> Self {
        Self::new(cookie_store)
            .with_mechanisms(config.client_mechanisms.iter().copied().collect())
            .with_lookup_timeout(config.cookie_lookup_timeout())
    }

    pub fn with_mechanisms(mut self, mechanisms: Mechanisms) -> Self {
        self.mechanisms = mechanisms;
        self
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Mechanisms this client can actually perform.
    fn usable(&self) -> Mechanisms {
        let mut usable = self.mechanisms;
        if self.uid.is_none() {
            usable.remove(Mechanisms::EXTERNAL);
        }
        usable
    }

    /// Run the client side of the handshake to completion.
    ///
    /// `Ok` carries the outcome whether or not authentication succeeded;
    /// `Err` means the stream itself failed.
    pub fn authenticate<S: Read + Write>(
        &self,
        stream: &mut S,
    ) -> Result<AuthOutcome, TransportError> {
        let mut lines = LineStream::new(stream);
        let mut negotiation = Negotiation::default();

        lines.write_byte(0)?;
        lines.send(&Command::Auth {
            mechanism: None,
            initial_response: None,
        })?;
        let mut state = AuthState::WaitData;
        debug!("Client handshake {:?} -> {state:?}", AuthState::Initial);

        loop {
            let command = lines.receive()?;
            let next = match (state, command) {
                (AuthState::WaitData, Command::Data(payload)) => {
                    match self.challenge(negotiation.current, &payload) {
                        Ok(response) => {
                            lines.send(&Command::Data(response))?;
                            AuthState::WaitOk
                        }
                        Err(e) => {
                            warn!("Challenge failed: {e}");
                            lines.send(&Command::Error(Some(String::from("Challenge failed"))))?;
                            AuthState::WaitData
                        }
                    }
                }
                (_, Command::Rejected(offered)) => {
                    self.fall_back(&mut lines, &mut negotiation, &offered)?
                }
                (AuthState::WaitData | AuthState::WaitOk, Command::Ok(guid)) => {
                    lines.send(&Command::Begin)?;
                    info!(
                        "Authenticated with {}",
                        negotiation.current.map_or("no mechanism", Mechanism::wire_name)
                    );
                    return Ok(AuthOutcome::authenticated(
                        AuthRole::Client,
                        negotiation.current,
                        guid,
                    ));
                }
                (AuthState::WaitData, Command::Error(_))
                | (AuthState::WaitOk, Command::Error(_) | Command::Data(_)) => {
                    lines.send(&Command::Cancel)?;
                    AuthState::WaitReject
                }
                (AuthState::WaitReject, other) => {
                    debug!("Expected REJECTED after CANCEL, got {}", other.name());
                    AuthState::Failed
                }
                (state, other) => {
                    debug!("Unexpected {} in {state:?}", other.name());
                    lines.send(&Command::Error(Some(INVALID_COMMAND_MESSAGE.to_string())))?;
                    state
                }
            };

            if next != state {
                debug!("Client handshake {state:?} -> {next:?}");
            }
            if next == AuthState::Failed {
                warn!("Client authentication failed");
                return Ok(AuthOutcome::failed(AuthRole::Client));
            }
            state = next;
        }
    }

    /// Drop the rejected mechanism and try the next one both sides support.
    fn fall_back<S: Read + Write>(
        &self,
        lines: &mut LineStream<'_, S>,
        negotiation: &mut Negotiation,
        offered: &[String],
    ) -> Result<AuthState, TransportError> {
        if let Some(rejected) = negotiation.current.take() {
            debug!("Mechanism {rejected} rejected");
            negotiation.failed.insert(rejected.flag());
        }

        let offered = Mechanisms::from_wire_names(offered.iter().map(String::as_str));
        let candidates = (offered & self.usable()).difference(negotiation.failed);

        let Some(next) = candidates.preferred().next() else {
            debug!(
                "No mechanism left: server offers [{}], client allows [{}]",
                offered.wire_names(),
                self.usable().wire_names()
            );
            return Ok(AuthState::Failed);
        };

        debug!("Trying mechanism {next}");
        negotiation.current = Some(next);
        lines.send(&Command::Auth {
            mechanism: Some(next.wire_name().to_string()),
            initial_response: self.initial_response(next),
        })?;
        Ok(AuthState::WaitData)
    }

    fn initial_response(&self, mechanism: Mechanism) -> Option<String> {
        match mechanism {
            Mechanism::External => self.uid.map(|uid| hex::encode(uid.to_string())),
            Mechanism::CookieSha1 if !self.username.is_empty() => {
                Some(cookie_sha1::client_initial_response(&self.username))
            }
            Mechanism::CookieSha1 | Mechanism::Anonymous => None,
        }
    }

    fn challenge(&self, mechanism: Option<Mechanism>, payload: &str) -> Result<String, AuthError> {
        match mechanism {
            Some(Mechanism::CookieSha1) => {
                cookie_sha1::client_response(self.cookie_store, payload, self.lookup_timeout)
            }
            Some(Mechanism::External) => self
                .uid
                .map(|uid| hex::encode(uid.to_string()))
                .ok_or_else(|| AuthError::credentials_rejected("No local uid to present")),
            Some(Mechanism::Anonymous) => Ok(String::new()),
            None => Err(AuthError::challenge("DATA received before any AUTH")),
        }
    }
}
