use crate::ErrorLocation;
use crate::Located;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RedactError {
    #[error("Serialization Error: {message} {location}")]
    Serialization {
        message: String,
        location: ErrorLocation,
    },
}

impl Located for RedactError {
    fn location(&self) -> ErrorLocation {
        match self {
            RedactError::Serialization { location, .. } => *location,
        }
    }
}
