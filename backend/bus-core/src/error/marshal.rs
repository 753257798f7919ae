use crate::error::signature::SignatureError;

use common::{ErrorLocation, Located};
use models::ModelError;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MarshalError {
    #[error("Arity Error: {message} {location}")]
    Arity {
        message: String,
        location: ErrorLocation,
    },

    #[error("Type Mismatch Error: {message} {location}")]
    TypeMismatch {
        message: String,
        location: ErrorLocation,
    },

    #[error("Variant Error: {message} {location}")]
    Variant {
        message: String,
        location: ErrorLocation,
    },

    #[error("Object Resolver Error: {message} {location}")]
    Resolver {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl MarshalError {
    /// Argument list length differs from the declared descriptors.
    #[track_caller]
    pub fn arity(expected: usize, actual: usize) -> Self {
        MarshalError::Arity {
            message: format!("Expected {expected} values but got {actual}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        MarshalError::TypeMismatch {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn resolver(message: impl Into<String>) -> Self {
        MarshalError::Resolver {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ModelError> for MarshalError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        MarshalError::Variant {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl Located for MarshalError {
    fn location(&self) -> ErrorLocation {
        match self {
            MarshalError::Arity { location, .. }
            | MarshalError::TypeMismatch { location, .. }
            | MarshalError::Variant { location, .. }
            | MarshalError::Resolver { location, .. } => *location,
            MarshalError::Signature(error) => error.location(),
        }
    }
}
