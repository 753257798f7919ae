use crate::ErrorLocation;

use common::Located;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Conversion Error: {message} {location}")]
    Conversion {
        message: String,
        location: ErrorLocation,
    },
}

impl Located for ModelError {
    fn location(&self) -> ErrorLocation {
        match self {
            ModelError::Validation { location, .. } | ModelError::Conversion { location, .. } => {
                *location
            }
        }
    }
}
