use common::{ErrorLocation, Located};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LoggerError {
    #[error("Log File Error: {message} {location}")]
    LogFile {
        message: String,
        location: ErrorLocation,
    },

    #[error("Logger Initialization Error: {message} {location}")]
    Initialization {
        message: String,
        location: ErrorLocation,
    },
}

impl Located for LoggerError {
    fn location(&self) -> ErrorLocation {
        match self {
            LoggerError::LogFile { location, .. } | LoggerError::Initialization { location, .. } => {
                *location
            }
        }
    }
}
