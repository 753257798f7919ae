use common::{ErrorLocation, Located};

use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CookieError {
    #[error("Keyring IO Error: {path}: {source} {location}")]
    Io {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid Cookie Context Error: '{context}' {location}")]
    InvalidContext {
        location: ErrorLocation,
        context: String,
    },

    #[error("Home Directory Not Found Error: cannot locate the keyring directory {location}")]
    HomeDirectoryNotFound { location: ErrorLocation },
}

impl Located for CookieError {
    fn location(&self) -> ErrorLocation {
        match self {
            CookieError::Io { location, .. }
            | CookieError::InvalidContext { location, .. }
            | CookieError::HomeDirectoryNotFound { location } => *location,
        }
    }
}
