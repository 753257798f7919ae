use common::{ErrorLocation, Located};

use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Fatal failures of the handshake stream. Never retried.
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Unexpected End Of Stream Error: {message} {location}")]
    UnexpectedEof {
        message: String,
        location: ErrorLocation,
    },

    #[error("Line Too Long Error: line exceeds {limit} bytes {location}")]
    LineTooLong {
        limit: usize,
        location: ErrorLocation,
    },

    #[error("Transport IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for TransportError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match error.kind() {
            ErrorKind::UnexpectedEof => TransportError::UnexpectedEof {
                message: String::from("Stream closed before a complete line was read"),
                location,
            },
            _ => TransportError::Io {
                message: error.to_string(),
                location,
            },
        }
    }
}

impl Located for TransportError {
    fn location(&self) -> ErrorLocation {
        match self {
            TransportError::UnexpectedEof { location, .. }
            | TransportError::LineTooLong { location, .. }
            | TransportError::Io { location, .. } => *location,
        }
    }
}
