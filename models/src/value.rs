//! Runtime values exchanged with the marshalling pipeline.

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::model_error::ModelError;
use crate::schema::builder::CustomSchemaBuilder;
use crate::schema::StructSchema;
use crate::serializable::DBusSerializable;
use crate::ErrorLocation;

use std::panic::Location;

/// A host value.
///
/// `Signature` is the wire form of a signature (a string), `Types` the parsed
/// host form. `Bytes` is a packed byte array, the preferred container for
/// `Array(Byte)` targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Float(f32),
    Str(String),
    ObjectPath(ObjectPath),
    Signature(String),
    Types(Vec<TypeDescriptor>),
    UnixFd(u32),
    Variant(Variant),
    Array(Vec<Value>),
    Bytes(Vec<u8>),
    Struct(StructValue),
    Dict(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    Custom(CustomValue),
    Object(ObjectRef),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn object_path(path: impl Into<String>) -> Self {
        Value::ObjectPath(ObjectPath::new(path))
    }

    /// Short name of the value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Int16(_) => "int16",
            Value::UInt16(_) => "uint16",
            Value::Int32(_) => "int32",
            Value::UInt32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::ObjectPath(_) => "object path",
            Value::Signature(_) => "signature",
            Value::Types(_) => "parsed signature",
            Value::UnixFd(_) => "unix fd",
            Value::Variant(_) => "variant",
            Value::Array(_) => "array",
            Value::Bytes(_) => "byte array",
            Value::Struct(_) => "struct",
            Value::Dict(_) => "dict",
            Value::Tuple(_) => "tuple",
            Value::Custom(_) => "custom",
            Value::Object(_) => "object reference",
        }
    }

    /// Work out the descriptor a value would carry inside a variant.
    ///
    /// Empty arrays and dicts carry no element information and cannot be
    /// inferred.
    #[track_caller]
    pub fn infer_descriptor(&self) -> Result<TypeDescriptor, ModelError> {
        let primitive = |kind: PrimitiveKind| Ok(TypeDescriptor::Primitive(kind));
        match self {
            Value::Bool(_) => primitive(PrimitiveKind::Boolean),
            Value::Byte(_) => primitive(PrimitiveKind::Byte),
            Value::Int16(_) => primitive(PrimitiveKind::Int16),
            Value::UInt16(_) => primitive(PrimitiveKind::UInt16),
            Value::Int32(_) => primitive(PrimitiveKind::Int32),
            Value::UInt32(_) => primitive(PrimitiveKind::UInt32),
            Value::Int64(_) => primitive(PrimitiveKind::Int64),
            Value::UInt64(_) => primitive(PrimitiveKind::UInt64),
            Value::Double(_) => primitive(PrimitiveKind::Double),
            Value::Float(_) => primitive(PrimitiveKind::Float),
            Value::Str(_) => primitive(PrimitiveKind::String),
            Value::ObjectPath(_) => primitive(PrimitiveKind::ObjectPath),
            Value::Signature(_) | Value::Types(_) => primitive(PrimitiveKind::Signature),
            Value::UnixFd(_) => primitive(PrimitiveKind::UnixFd),
            Value::Variant(_) => primitive(PrimitiveKind::Variant),
            Value::Bytes(_) => Ok(TypeDescriptor::array(PrimitiveKind::Byte)),
            Value::Array(items) => {
                let first = items.first().ok_or_else(|| ModelError::Conversion {
                    message: String::from("Cannot infer the element type of an empty array"),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                let element = first.infer_descriptor()?;
                for item in &items[1..] {
                    if item.infer_descriptor()? != element {
                        return Err(ModelError::Conversion {
                            message: format!(
                                "Array elements differ in type: {} vs {}",
                                first.kind_name(),
                                item.kind_name()
                            ),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                }
                Ok(TypeDescriptor::Array(Box::new(element)))
            }
            Value::Struct(value) => {
                let fields = value
                    .fields
                    .iter()
                    .map(Value::infer_descriptor)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeDescriptor::Struct(StructSchema::anonymous(fields)))
            }
            Value::Dict(entries) => {
                let (key, value) = entries.first().ok_or_else(|| ModelError::Conversion {
                    message: String::from("Cannot infer the entry types of an empty dict"),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                TypeDescriptor::dict(key.infer_descriptor()?, value.infer_descriptor()?)
            }
            Value::Tuple(items) => Ok(TypeDescriptor::Tuple(
                items
                    .iter()
                    .map(Value::infer_descriptor)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::Custom(value) => {
                let shape = value
                    .fields
                    .iter()
                    .map(Value::infer_descriptor)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeDescriptor::CustomSerializable(
                    CustomSchemaBuilder::default()
                        .with_type_name(value.type_name.clone())
                        .with_wire_types(shape)
                        .build()?,
                ))
            }
            Value::Object(object) => Ok(TypeDescriptor::Interface(object.interface.clone())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Signature(s) => Some(s),
            Value::ObjectPath(path) => Some(&path.path),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }
}

/// A value tagged with its own type.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    descriptor: TypeDescriptor,
    value: Box<Value>,
}

impl Variant {
    /// Wrap a value, inferring the descriptor it carries.
    #[track_caller]
    pub fn new(value: Value) -> Result<Self, ModelError> {
        let descriptor = value.infer_descriptor()?;
        Ok(Self {
            descriptor,
            value: Box::new(value),
        })
    }

    pub fn with_descriptor(descriptor: TypeDescriptor, value: Value) -> Self {
        Self {
            descriptor,
            value: Box::new(value),
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        *self.value
    }
}

/// Object path as received from the wire.
///
/// `source` is the unique bus name of the sender when the path arrived in a
/// message; plain paths leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    pub path: String,
    pub source: Option<String>,
}

impl ObjectPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Reference to a live object: either exported locally or a remote proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub interface: String,
    pub path: String,
    pub source: Option<String>,
}

impl ObjectRef {
    pub fn new(interface: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            path: path.into(),
            source: None,
        }
    }
}

/// Field values of a struct in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub name: Option<String>,
    pub fields: Vec<Value>,
}

impl StructValue {
    pub fn new(fields: Vec<Value>) -> Self {
        Self { name: None, fields }
    }

    /// Struct value carrying the name of the schema it belongs to.
    pub fn of(schema: &StructSchema, fields: Vec<Value>) -> Self {
        Self {
            name: schema.name().map(str::to_string),
            fields,
        }
    }
}

/// A custom serializable value in its flattened form.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomValue {
    pub type_name: String,
    pub fields: Vec<Value>,
}

impl CustomValue {
    pub fn new(type_name: impl Into<String>, fields: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Rebuild the application type from its wire values.
    #[track_caller]
    pub fn decode<T: DBusSerializable>(self) -> Result<T, ModelError> {
        if self.type_name != T::type_name() {
            return Err(ModelError::Conversion {
                message: format!(
                    "Custom value of type {} cannot decode into {}",
                    self.type_name,
                    T::type_name()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        T::deserialize(self.fields)
    }
}
