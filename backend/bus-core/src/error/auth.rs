//! Mechanism-level authentication failures.
//!
//! These never abort a handshake on their own: the client answers them by
//! falling back to the next mechanism, the server by rejecting the attempt.
//! Stream failures are [`TransportError`](crate::error::TransportError).

use crate::error::cookie::CookieError;

use common::{ErrorLocation, Located};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Auth Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Auth Challenge Error: {message} {location}")]
    Challenge {
        message: String,
        location: ErrorLocation,
    },

    #[error("Cookie Not Found Error: no usable cookie {id} in context {context} {location}")]
    CookieNotFound {
        context: String,
        id: String,
        location: ErrorLocation,
    },

    #[error("Auth Hash Mismatch Error: client response does not match {location}")]
    HashMismatch { location: ErrorLocation },

    #[error("Credentials Rejected Error: {message} {location}")]
    CredentialsRejected {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl AuthError {
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        AuthError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn challenge(message: impl Into<String>) -> Self {
        AuthError::Challenge {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn cookie_not_found(context: impl Into<String>, id: impl Into<String>) -> Self {
        AuthError::CookieNotFound {
            context: context.into(),
            id: id.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn hash_mismatch() -> Self {
        AuthError::HashMismatch {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn credentials_rejected(message: impl Into<String>) -> Self {
        AuthError::CredentialsRejected {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<hex::FromHexError> for AuthError {
    #[track_caller]
    fn from(error: hex::FromHexError) -> Self {
        AuthError::Decode {
            message: format!("Invalid hex payload: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::string::FromUtf8Error> for AuthError {
    #[track_caller]
    fn from(error: std::string::FromUtf8Error) -> Self {
        AuthError::Decode {
            message: format!("Payload is not UTF-8: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl Located for AuthError {
    fn location(&self) -> ErrorLocation {
        match self {
            AuthError::Decode { location, .. }
            | AuthError::Challenge { location, .. }
            | AuthError::CookieNotFound { location, .. }
            | AuthError::HashMismatch { location }
            | AuthError::CredentialsRejected { location, .. } => *location,
            AuthError::Cookie(error) => error.location(),
        }
    }
}
