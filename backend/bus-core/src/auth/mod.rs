//! SASL handshake run on a fresh connection before any message flows.
//!
//! The client writes one NUL credential byte, then both sides exchange CRLF
//! terminated command lines until the client sends `BEGIN` or a side gives
//! up. Mechanism failures are handled inside the exchange (fallback on the
//! client, rejection on the server); only stream failures surface as errors.

pub mod command;
pub mod credentials;
pub mod mechanism;

mod client;
mod cookie_sha1;
mod server;
mod stream;

pub use client::ClientAuthenticator;
pub use command::Command;
pub use mechanism::{Mechanism, Mechanisms};
pub use server::ServerAuthenticator;
pub use stream::MAX_LINE_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRole {
    Client,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing exchanged yet.
    Initial,
    WaitData,
    WaitOk,
    WaitReject,
    WaitAuth,
    WaitBegin,
    Authenticated,
    Failed,
}

impl AuthState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::Failed)
    }
}

/// How a handshake ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub role: AuthRole,
    pub state: AuthState,
    /// Mechanism that succeeded.
    pub mechanism: Option<Mechanism>,
    /// Server guid: received in `OK` by the client, sent by the server.
    pub guid: Option<String>,
}

impl AuthOutcome {
    pub(crate) fn failed(role: AuthRole) -> Self {
        Self {
            role,
            state: AuthState::Failed,
            mechanism: None,
            guid: None,
        }
    }

    pub(crate) fn authenticated(role: AuthRole, mechanism: Option<Mechanism>, guid: String) -> Self {
        Self {
            role,
            state: AuthState::Authenticated,
            mechanism,
            guid: Some(guid),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }
}
