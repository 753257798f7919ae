//! Argument conversion between host values and wire values.
//!
//! Outbound conversion flattens tuples and custom serializable values into
//! their components, wraps free variant slots, resolves object references and
//! renders parsed signatures. Inbound conversion reverses each step against the
//! declared descriptors.

mod inbound;
mod outbound;
pub mod resolver;

pub use resolver::{ObjectResolver, PathResolver};

use crate::error::{MarshalError, SignatureError};
use crate::signature::{self, Capabilities};

use models::{PrimitiveKind, TypeDescriptor, Value};

/// Flattened argument list ready for the message body.
///
/// `descriptors` are wire descriptors: exactly what the body signature
/// decodes to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireArguments {
    pub values: Vec<Value>,
    pub descriptors: Vec<TypeDescriptor>,
}

impl WireArguments {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Body signature of these arguments.
    pub fn signature(&self, capabilities: Capabilities) -> Result<String, SignatureError> {
        signature::signature_of(&self.descriptors, capabilities)
    }
}

/// Converts argument lists in both directions for one connection.
pub struct ParameterConverter<'r> {
    resolver: &'r dyn ObjectResolver,
    capabilities: Capabilities,
}

impl<'r> ParameterConverter<'r> {
    pub fn new(resolver: &'r dyn ObjectResolver) -> Self {
        Self {
            resolver,
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

/// Number of wire values a descriptor occupies.
pub(crate) fn wire_arity(descriptor: &TypeDescriptor) -> usize {
    match descriptor {
        TypeDescriptor::CustomSerializable(schema) => {
            schema.wire_shape().iter().map(wire_arity).sum()
        }
        TypeDescriptor::Tuple(components) => components.iter().map(wire_arity).sum(),
        _ => 1,
    }
}

/// The wire descriptor a single-slot host descriptor decodes back to.
#[track_caller]
pub(crate) fn wire_descriptor(
    descriptor: &TypeDescriptor,
    capabilities: Capabilities,
) -> Result<TypeDescriptor, MarshalError> {
    let mut parts = signature::to_signature(descriptor, capabilities)?;
    if parts.len() != 1 {
        return Err(MarshalError::type_mismatch(format!(
            "{descriptor} occupies {} wire values where one is expected",
            parts.len()
        )));
    }
    let mut decoded = signature::parse_signature(&parts.remove(0))?;
    match decoded.len() {
        1 => Ok(decoded.remove(0)),
        n => Err(MarshalError::type_mismatch(format!(
            "{descriptor} decodes to {n} wire types"
        ))),
    }
}

/// Whether `value` already has the host shape of a primitive slot.
pub(crate) fn primitive_matches(value: &Value, kind: PrimitiveKind) -> bool {
    matches!(
        (value, kind),
        (Value::Bool(_), PrimitiveKind::Boolean)
            | (Value::Byte(_), PrimitiveKind::Byte)
            | (Value::Int16(_), PrimitiveKind::Int16)
            | (Value::UInt16(_), PrimitiveKind::UInt16)
            | (Value::Int32(_), PrimitiveKind::Int32)
            | (Value::UInt32(_), PrimitiveKind::UInt32)
            | (Value::Int64(_), PrimitiveKind::Int64)
            | (Value::UInt64(_), PrimitiveKind::UInt64)
            | (Value::Double(_), PrimitiveKind::Double)
            | (Value::Float(_), PrimitiveKind::Float)
            | (Value::Str(_), PrimitiveKind::String)
            | (Value::ObjectPath(_), PrimitiveKind::ObjectPath)
            | (Value::Signature(_), PrimitiveKind::Signature)
            | (Value::UnixFd(_), PrimitiveKind::UnixFd)
    )
}
