use crate::error::MarshalError;
use crate::marshal::{ParameterConverter, primitive_matches, wire_arity};
use crate::signature;

use models::{CustomValue, ObjectPath, PrimitiveKind, StructValue, TypeDescriptor, Value, Variant};

impl ParameterConverter<'_> {
    /// Rebuild host arguments from wire values.
    ///
    /// A lone tuple descriptor stands for its components, which are returned
    /// unwrapped. Custom serializable descriptors consume as many wire values
    /// as their shape declares and produce one value.
    pub fn from_wire_parameters(
        &self,
        values: Vec<Value>,
        descriptors: &[TypeDescriptor],
    ) -> Result<Vec<Value>, MarshalError> {
        let descriptors = match descriptors {
            [TypeDescriptor::Tuple(components)] => components.as_slice(),
            other => other,
        };

        self.regroup(values, descriptors)
    }

    /// Pair wire values with `descriptors`, collapsing every custom or tuple
    /// descriptor back into the single value it was flattened from.
    fn regroup(
        &self,
        values: Vec<Value>,
        descriptors: &[TypeDescriptor],
    ) -> Result<Vec<Value>, MarshalError> {
        let expected: usize = descriptors.iter().map(wire_arity).sum();
        if expected != values.len() {
            return Err(MarshalError::arity(expected, values.len()));
        }

        let mut remaining = values.into_iter();
        let mut converted = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            match descriptor {
                TypeDescriptor::CustomSerializable(schema) => {
                    let slice: Vec<Value> = remaining.by_ref().take(wire_arity(descriptor)).collect();
                    let fields = self.regroup(slice, schema.wire_shape())?;
                    converted.push(Value::Custom(CustomValue::new(schema.type_name(), fields)));
                }
                TypeDescriptor::Tuple(components) => {
                    let slice: Vec<Value> = remaining.by_ref().take(wire_arity(descriptor)).collect();
                    converted.push(Value::Tuple(self.regroup(slice, components)?));
                }
                _ => {
                    let Some(value) = remaining.next() else {
                        return Err(MarshalError::arity(expected, converted.len()));
                    };
                    converted.push(self.from_wire(value, descriptor)?);
                }
            }
        }

        Ok(converted)
    }

    /// Convert one wire value to the declared host shape.
    pub fn from_wire(&self, value: Value, descriptor: &TypeDescriptor) -> Result<Value, MarshalError> {
        match (value, descriptor) {
            (Value::Variant(variant), TypeDescriptor::TypeVariable(_)) => {
                let inner = variant.descriptor().clone();
                self.from_wire(variant.into_value(), &inner)
            }
            (Value::Variant(variant), TypeDescriptor::Primitive(PrimitiveKind::Variant)) => {
                let inner = variant.descriptor().clone();
                let value = self.from_wire(variant.into_value(), &inner)?;
                Ok(Value::Variant(Variant::with_descriptor(inner, value)))
            }
            (Value::Signature(text), TypeDescriptor::Primitive(PrimitiveKind::Signature)) => {
                Ok(Value::Types(signature::parse_signature(&text)?))
            }
            (value @ Value::Types(_), TypeDescriptor::Primitive(PrimitiveKind::Signature)) => Ok(value),
            (Value::ObjectPath(path), TypeDescriptor::Interface(interface)) => Ok(Value::Object(
                self.resolver
                    .import_object(path.source.as_deref(), &path.path, interface)?,
            )),
            (Value::ObjectPath(path), TypeDescriptor::Primitive(PrimitiveKind::ObjectPath)) => {
                Ok(Value::ObjectPath(ObjectPath::new(path.path)))
            }
            (Value::Struct(value), TypeDescriptor::Struct(schema)) => {
                let fields = self.regroup(value.fields, schema.fields())?;
                Ok(Value::Struct(StructValue::of(schema, fields)))
            }
            (Value::Bytes(bytes), TypeDescriptor::Array(element))
                if element.as_primitive() == Some(PrimitiveKind::Byte) =>
            {
                Ok(Value::Bytes(bytes))
            }
            (Value::Array(items), TypeDescriptor::Array(element))
                if element.as_primitive() == Some(PrimitiveKind::Byte) =>
            {
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Byte(byte) => Ok(byte),
                        other => Err(MarshalError::type_mismatch(format!(
                            "Byte array holds a {} element",
                            other.kind_name()
                        ))),
                    })
                    .collect::<Result<Vec<u8>, _>>()
                    .map(Value::Bytes)
            }
            (Value::Array(items), TypeDescriptor::Array(element)) => items
                .into_iter()
                .map(|item| self.from_wire(item, element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Value::Dict(entries), TypeDescriptor::Dict(key, value)) => entries
                .into_iter()
                .map(|(k, v)| Ok((self.from_wire(k, key)?, self.from_wire(v, value)?)))
                .collect::<Result<Vec<_>, MarshalError>>()
                .map(Value::Dict),
            (Value::Double(number), TypeDescriptor::Primitive(PrimitiveKind::Float)) => {
                Ok(Value::Float(number as f32))
            }
            (value, TypeDescriptor::CustomSerializable(schema)) if wire_arity(descriptor) == 1 => {
                let fields = self.regroup(vec![value], schema.wire_shape())?;
                Ok(Value::Custom(CustomValue::new(schema.type_name(), fields)))
            }
            (value, TypeDescriptor::Primitive(kind)) if primitive_matches(&value, *kind) => Ok(value),
            (value, descriptor) => Err(MarshalError::type_mismatch(format!(
                "Cannot unmarshal {} as {descriptor}",
                value.kind_name()
            ))),
        }
    }
}
