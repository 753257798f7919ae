use common::{ErrorLocation, Located};

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SignatureError {
    #[error("Malformed Signature Error: {message} {location}")]
    Malformed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unrepresentable Type Error: {message} {location}")]
    Unrepresentable {
        message: String,
        location: ErrorLocation,
    },

    #[error("Signature Limit Error: {message} {location}")]
    LimitExceeded {
        message: String,
        location: ErrorLocation,
    },
}

impl SignatureError {
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        SignatureError::Malformed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unrepresentable(message: impl Into<String>) -> Self {
        SignatureError::Unrepresentable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        SignatureError::LimitExceeded {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl Located for SignatureError {
    fn location(&self) -> ErrorLocation {
        match self {
            SignatureError::Malformed { location, .. }
            | SignatureError::Unrepresentable { location, .. }
            | SignatureError::LimitExceeded { location, .. } => *location,
        }
    }
}
