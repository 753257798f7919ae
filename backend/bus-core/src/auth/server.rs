use crate::auth::command::Command;
use crate::auth::cookie_sha1::ServerChallenge;
use crate::auth::credentials::current_uid;
use crate::auth::mechanism::{Mechanism, Mechanisms};
use crate::auth::stream::LineStream;
use crate::auth::{AuthOutcome, AuthRole, AuthState};
use crate::config::AuthConfig;
use crate::cookie_store::CookieStore;
use crate::error::{AuthError, TransportError};
use crate::DEFAULT_COOKIE_CONTEXT;

use std::io::{Read, Write};

use log::{debug, info, warn};
use uuid::Uuid;

const INVALID_COMMAND_MESSAGE: &str = "Got invalid command";

/// Result of feeding one client message to a mechanism.
enum Step {
    Continue(String),
    Accept,
    Reject,
}

/// Server role of the handshake.
pub struct ServerAuthenticator<'a> {
    mechanisms: Mechanisms,
    expected_uid: Option<u32>,
    kernel_uid: Option<u32>,
    guid: String,
    cookie_store: &'a CookieStore,
    cookie_context: String,
}

#[derive(Default)]
struct Attempt {
    mechanism: Option<Mechanism>,
    challenge: Option<ServerChallenge>,
}

impl<'a> ServerAuthenticator<'a> {
    pub fn new(cookie_store: &'a CookieStore) -> Self {
        Self {
            mechanisms: Mechanisms::all(),
            expected_uid: current_uid(),
            kernel_uid: None,
            guid: Uuid::new_v4().simple().to_string(),
            cookie_store,
            cookie_context: DEFAULT_COOKIE_CONTEXT.to_string(),
        }
    }

    pub fn from_config(config: &AuthConfig, cookie_store: &'a CookieStore) -> Self {
        Self::new(cookie_store)
            .with_mechanisms(config.server_mechanisms.iter().copied().collect())
            .with_cookie_context(config.cookie_context.clone())
    }

    pub fn with_mechanisms(mut self, mechanisms: Mechanisms) -> Self {
        self.mechanisms = mechanisms;
        self
    }

    /// Uid a connecting `EXTERNAL` client must present.
    pub fn with_expected_uid(mut self, uid: u32) -> Self {
        self.expected_uid = Some(uid);
        self
    }

    /// Peer uid reported by the transport (e.g. `SO_PEERCRED`).
    pub fn with_kernel_uid(mut self, uid: Option<u32>) -> Self {
        self.kernel_uid = uid;
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    pub fn with_cookie_context(mut self, context: impl Into<String>) -> Self {
        self.cookie_context = context.into();
        self
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    /// Run the server side of the handshake to completion.
    pub fn authenticate<S: Read + Write>(
        &self,
        stream: &mut S,
    ) -> Result<AuthOutcome, TransportError> {
        let mut lines = LineStream::new(stream);

        let credential = lines.read_byte()?;
        if credential != 0 {
            warn!("Client sent non-zero credential byte {credential:#04x}");
            return Ok(AuthOutcome::failed(AuthRole::Server));
        }

        let mut attempt = Attempt::default();
        let mut state = AuthState::WaitAuth;
        debug!("Server handshake {:?} -> {state:?}", AuthState::Initial);

        loop {
            let command = lines.receive()?;
            let next = match (state, command) {
                (
                    AuthState::WaitAuth,
                    Command::Auth {
                        mechanism,
                        initial_response,
                    },
                ) => {
                    let step = self.start(&mut attempt, mechanism.as_deref(), initial_response);
                    self.apply(&mut lines, &mut attempt, step)?
                }
                (AuthState::WaitData, Command::Data(payload)) => {
                    let step = self.proceed(&mut attempt, &payload);
                    self.apply(&mut lines, &mut attempt, step)?
                }
                (AuthState::WaitAuth, Command::Error(_)) => {
                    self.reject(&mut lines, &mut attempt)?
                }
                (AuthState::WaitData | AuthState::WaitBegin, Command::Error(_) | Command::Cancel) => {
                    self.reject(&mut lines, &mut attempt)?
                }
                (AuthState::WaitBegin, Command::Begin) => {
                    info!(
                        "Client authenticated with {}",
                        attempt.mechanism.map_or("no mechanism", Mechanism::wire_name)
                    );
                    return Ok(AuthOutcome::authenticated(
                        AuthRole::Server,
                        attempt.mechanism,
                        self.guid.clone(),
                    ));
                }
                (state, Command::Begin) => {
                    debug!("BEGIN received in {state:?}");
                    AuthState::Failed
                }
                (state, other) => {
                    debug!("Unexpected {} in {state:?}", other.name());
                    lines.send(&Command::Error(Some(INVALID_COMMAND_MESSAGE.to_string())))?;
                    state
                }
            };

            if next != state {
                debug!("Server handshake {state:?} -> {next:?}");
            }
            if next == AuthState::Failed {
                warn!("Server authentication failed");
                return Ok(AuthOutcome::failed(AuthRole::Server));
            }
            state = next;
        }
    }

    /// Handle `AUTH`. Bare, unknown and disabled mechanisms are rejected.
    fn start(
        &self,
        attempt: &mut Attempt,
        mechanism: Option<&str>,
        initial_response: Option<String>,
    ) -> Step {
        let Some(mechanism) = mechanism
            .and_then(Mechanism::from_wire_name)
            .filter(|m| self.mechanisms.has(*m))
        else {
            return Step::Reject;
        };

        debug!("Client requested {mechanism}");
        attempt.mechanism = Some(mechanism);

        match mechanism {
            Mechanism::Anonymous => Step::Accept,
            Mechanism::External => match initial_response {
                Some(payload) => self.verify_external(&payload),
                None => Step::Continue(String::new()),
            },
            Mechanism::CookieSha1 => {
                match ServerChallenge::issue(self.cookie_store, &self.cookie_context) {
                    Ok((challenge, payload)) => {
                        attempt.challenge = Some(challenge);
                        Step::Continue(payload)
                    }
                    Err(e) => {
                        warn!("Cannot issue cookie challenge: {e}");
                        Step::Reject
                    }
                }
            }
        }
    }

    /// Handle `DATA` for the mechanism in progress.
    fn proceed(&self, attempt: &mut Attempt, payload: &str) -> Step {
        match attempt.mechanism {
            Some(Mechanism::External) => self.verify_external(payload),
            Some(Mechanism::CookieSha1) => match attempt.challenge.take() {
                Some(challenge) => match challenge.verify(payload) {
                    Ok(()) => Step::Accept,
                    Err(e) => {
                        debug!("Cookie response rejected: {e}");
                        Step::Reject
                    }
                },
                None => Step::Reject,
            },
            Some(Mechanism::Anonymous) => Step::Accept,
            None => Step::Reject,
        }
    }

    fn verify_external(&self, payload: &str) -> Step {
        match self.check_external(payload) {
            Ok(()) => Step::Accept,
            Err(e) => {
                debug!("EXTERNAL rejected: {e}");
                Step::Reject
            }
        }
    }

    fn check_external(&self, payload: &str) -> Result<(), AuthError> {
        let claimed = String::from_utf8(hex::decode(payload)?)?;
        let expected = self
            .expected_uid
            .ok_or_else(|| AuthError::credentials_rejected("Server has no uid to compare"))?;

        if claimed != expected.to_string() {
            return Err(AuthError::credentials_rejected(format!(
                "Client claims uid {claimed}"
            )));
        }
        if let Some(kernel_uid) = self.kernel_uid
            && kernel_uid != expected
        {
            return Err(AuthError::credentials_rejected(format!(
                "Transport reports uid {kernel_uid}"
            )));
        }
        Ok(())
    }

    fn apply<S: Read + Write>(
        &self,
        lines: &mut LineStream<'_, S>,
        attempt: &mut Attempt,
        step: Step,
    ) -> Result<AuthState, TransportError> {
        match step {
            Step::Continue(payload) => {
                lines.send(&Command::Data(payload))?;
                Ok(AuthState::WaitData)
            }
            Step::Accept => {
                lines.send(&Command::Ok(self.guid.clone()))?;
                Ok(AuthState::WaitBegin)
            }
            Step::Reject => self.reject(lines, attempt),
        }
    }

    fn reject<S: Read + Write>(
        &self,
        lines: &mut LineStream<'_, S>,
        attempt: &mut Attempt,
    ) -> Result<AuthState, TransportError> {
        *attempt = Attempt::default();
        lines.send(&Command::Rejected(
            self.mechanisms
                .preferred()
                .map(|m| m.wire_name().to_string())
                .collect(),
        ))?;
        Ok(AuthState::WaitAuth)
    }
}
