//! Application-defined types that flatten themselves onto the wire.

use crate::error::model_error::ModelError;
use crate::schema::builder::CustomSchemaBuilder;
use crate::schema::CustomSchema;
use crate::value::{CustomValue, Value};
use crate::TypeDescriptor;

/// A host type that declares its own wire representation.
///
/// The signature of such a type is the concatenation of its wire shape; the
/// type itself never appears on the wire.
pub trait DBusSerializable: Sized {
    fn type_name() -> &'static str;

    /// Ordered native wire types this type serializes into.
    fn wire_shape() -> Vec<TypeDescriptor>;

    fn serialize(&self) -> Vec<Value>;

    fn deserialize(values: Vec<Value>) -> Result<Self, ModelError>;

    #[track_caller]
    fn schema() -> Result<CustomSchema, ModelError> {
        CustomSchemaBuilder::default()
            .with_type_name(Self::type_name())
            .with_wire_types(Self::wire_shape())
            .build()
    }

    #[track_caller]
    fn descriptor() -> Result<TypeDescriptor, ModelError> {
        Ok(TypeDescriptor::CustomSerializable(Self::schema()?))
    }

    fn to_value(&self) -> Value {
        Value::Custom(CustomValue::new(Self::type_name(), self.serialize()))
    }
}
