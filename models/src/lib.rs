//! Domain models for the bus.
//!
//! This crate contains pure data structures representing the core
//! concepts of the wire protocol. Models carry validation but no protocol
//! logic - they're just data that can be passed between layers.
//!
//! - [`TypeDescriptor`]: host-side type shapes (primitives, containers,
//!   struct schemas, custom serializable shapes, tuples, variant slots)
//! - [`Value`]: runtime values conforming to those shapes
//! - [`Cookie`]: one keyring entry of the cookie authentication mechanism
//!
//! Struct and custom schemas are declared explicitly through builders; nothing
//! in here inspects host types at runtime.

pub mod cookie;
pub mod descriptor;
pub mod error;
pub mod schema;
pub mod serializable;
pub mod value;

pub use common::ErrorLocation;
pub use cookie::Cookie;
pub use descriptor::{PrimitiveKind, TypeDescriptor};
pub use error::model_error::ModelError;
pub use schema::builder::{CustomSchemaBuilder, StructSchemaBuilder};
pub use schema::{CustomSchema, StructSchema};
pub use serializable::DBusSerializable;
pub use value::{CustomValue, ObjectPath, ObjectRef, StructValue, Value, Variant};

#[cfg(test)]
mod tests;
