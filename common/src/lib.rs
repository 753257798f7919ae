//! Shared primitives for the bus workspace.
//!
//! This crate holds the small building blocks every other crate leans on:
//!
//! - [`ErrorLocation`]: `file:line:column` capture for error variants
//! - [`Located`]: uniform access to the location of any workspace error
//! - [`RedactedSecret`]: shared-secret wrapper that never prints its value
//!
//! ## Architecture
//!
//! - **common** (this crate): error plumbing and secret handling
//! - **models**: pure data (type descriptors, values, cookies)
//! - **bus-core**: signature codec, marshalling, SASL, keyring, object tree

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use error::Located;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
