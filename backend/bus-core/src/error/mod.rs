pub mod auth;
pub mod config;
pub mod cookie;
pub mod logger;
pub mod marshal;
pub mod object_path;
pub mod signature;
pub mod transport;

pub use auth::AuthError;
pub use config::ConfigError;
pub use cookie::CookieError;
pub use logger::LoggerError;
pub use marshal::MarshalError;
pub use object_path::ObjectPathError;
pub use signature::SignatureError;
pub use transport::TransportError;

use models::ModelError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Marshal(#[from] MarshalError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Cookie(#[from] CookieError),

    #[error(transparent)]
    ObjectPath(#[from] ObjectPathError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logger(#[from] LoggerError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
