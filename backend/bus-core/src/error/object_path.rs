use common::{ErrorLocation, Located};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ObjectPathError {
    #[error("Invalid Object Path Error: '{path}' {location}")]
    InvalidPath {
        path: String,
        location: ErrorLocation,
    },
}

impl Located for ObjectPathError {
    fn location(&self) -> ErrorLocation {
        match self {
            ObjectPathError::InvalidPath { location, .. } => *location,
        }
    }
}
