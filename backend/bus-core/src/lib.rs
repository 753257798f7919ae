//! Connection-level machinery of the message bus.
//!
//! - [`signature`]: host type descriptors to and from wire signature strings
//! - [`marshal`]: flattening and rebuilding argument values against descriptors
//! - [`auth`]: the SASL line handshake, client and server roles
//! - [`cookie_store`]: the file keyring behind `DBUS_COOKIE_SHA1`
//! - [`object_tree`]: exported objects indexed by object path
//!
//! Transports, message framing and dispatch live elsewhere and call into these
//! modules.

pub mod auth;
pub mod config;
pub mod cookie_store;
pub mod error;
pub mod logger;
pub mod marshal;
pub mod object_tree;
pub mod signature;

#[cfg(test)]
mod tests;

pub use config::BusConfig;
pub use error::CoreError;

/// Keyring directory under the user's home.
pub const KEYRING_DIR_NAME: &str = ".dbus-keyrings";

/// Cookie context used when none is configured.
pub const DEFAULT_COOKIE_CONTEXT: &str = "org_freedesktop_general";
