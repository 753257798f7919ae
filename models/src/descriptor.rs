//! Host-side type descriptors.

use crate::error::model_error::ModelError;
use crate::schema::{CustomSchema, StructSchema};
use crate::ErrorLocation;

use std::fmt;
use std::panic::Location;

/// Leaf kinds of the wire type system.
///
/// `Float` is the host single-precision type. Whether it travels as its own
/// wire code or is widened to `Double` is decided by the signature codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    Float,
    String,
    ObjectPath,
    UnixFd,
    Signature,
    Variant,
}

impl PrimitiveKind {
    /// Basic kinds may be used as dictionary keys. Variants may not.
    pub fn is_basic(self) -> bool {
        !matches!(self, PrimitiveKind::Variant)
    }
}

/// Recursive description of a host type as the bus sees it.
///
/// `Tuple`, `TypeVariable` and `Interface` only exist on the host side: a
/// tuple is spliced into its components, a type variable is a variant slot and
/// an interface is an object-reference slot carried as an object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Array(Box<TypeDescriptor>),
    Struct(StructSchema),
    Dict(Box<TypeDescriptor>, Box<TypeDescriptor>),
    CustomSerializable(CustomSchema),
    Tuple(Vec<TypeDescriptor>),
    TypeVariable(String),
    Interface(String),
}

impl TypeDescriptor {
    pub fn array(element: impl Into<TypeDescriptor>) -> Self {
        TypeDescriptor::Array(Box::new(element.into()))
    }

    /// Build a dictionary descriptor, enforcing a basic key.
    #[track_caller]
    pub fn dict(
        key: impl Into<TypeDescriptor>,
        value: impl Into<TypeDescriptor>,
    ) -> Result<Self, ModelError> {
        let key = key.into();
        match key {
            TypeDescriptor::Primitive(kind) if kind.is_basic() => {
                Ok(TypeDescriptor::Dict(Box::new(key), Box::new(value.into())))
            }
            other => Err(ModelError::Validation {
                message: format!("Dictionary key must be a basic type, got {other}"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    pub fn tuple(components: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Tuple(components)
    }

    pub fn type_variable(name: impl Into<String>) -> Self {
        TypeDescriptor::TypeVariable(name.into())
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeDescriptor::Interface(name.into())
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeDescriptor::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// True for shapes that occupy more than one wire slot or none at all.
    pub fn is_spliced(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::CustomSerializable(_) | TypeDescriptor::Tuple(_)
        )
    }
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(kind)
    }
}

impl From<StructSchema> for TypeDescriptor {
    fn from(schema: StructSchema) -> Self {
        TypeDescriptor::Struct(schema)
    }
}

impl From<CustomSchema> for TypeDescriptor {
    fn from(schema: CustomSchema) -> Self {
        TypeDescriptor::CustomSerializable(schema)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => write!(f, "{kind:?}"),
            TypeDescriptor::Array(element) => write!(f, "Array<{element}>"),
            TypeDescriptor::Struct(schema) => {
                write!(f, "Struct {}(", schema.name().unwrap_or(""))?;
                write_list(f, schema.fields())?;
                write!(f, ")")
            }
            TypeDescriptor::Dict(key, value) => write!(f, "Dict<{key}, {value}>"),
            TypeDescriptor::CustomSerializable(schema) => {
                write!(f, "Custom {}(", schema.type_name())?;
                write_list(f, schema.wire_shape())?;
                write!(f, ")")
            }
            TypeDescriptor::Tuple(components) => {
                write!(f, "Tuple(")?;
                write_list(f, components)?;
                write!(f, ")")
            }
            TypeDescriptor::TypeVariable(name) => write!(f, "<{name}>"),
            TypeDescriptor::Interface(name) => write!(f, "Interface {name}"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
