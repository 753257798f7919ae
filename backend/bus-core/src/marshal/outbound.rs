use crate::error::MarshalError;
use crate::marshal::{ParameterConverter, WireArguments, primitive_matches, wire_descriptor};
use crate::signature;

use models::{ObjectPath, PrimitiveKind, StructValue, TypeDescriptor, Value, Variant};

use std::collections::VecDeque;

use log::trace;

impl ParameterConverter<'_> {
    /// Flatten host arguments into wire values.
    ///
    /// Pairs are taken from a worklist. Tuple and custom values are replaced
    /// in place by their components, so the output follows the body
    /// signature one value per slot.
    pub fn to_wire(
        &self,
        values: Vec<Value>,
        descriptors: &[TypeDescriptor],
    ) -> Result<WireArguments, MarshalError> {
        if values.len() != descriptors.len() {
            return Err(MarshalError::arity(descriptors.len(), values.len()));
        }

        let mut work: VecDeque<(Value, TypeDescriptor)> =
            values.into_iter().zip(descriptors.iter().cloned()).collect();
        let mut wire = WireArguments::default();

        while let Some((value, descriptor)) = work.pop_front() {
            match (value, descriptor) {
                (Value::Custom(custom), TypeDescriptor::CustomSerializable(schema)) => {
                    if custom.type_name != schema.type_name() {
                        return Err(MarshalError::type_mismatch(format!(
                            "Value of custom type {} declared as {}",
                            custom.type_name,
                            schema.type_name()
                        )));
                    }
                    if custom.fields.len() != schema.arity() {
                        return Err(MarshalError::type_mismatch(format!(
                            "Custom type {} serialized {} values, its wire shape has {}",
                            custom.type_name,
                            custom.fields.len(),
                            schema.arity()
                        )));
                    }
                    trace!("Splicing custom type {} into {} values", custom.type_name, schema.arity());
                    push_front_all(&mut work, custom.fields, schema.wire_shape());
                }
                (Value::Tuple(items), TypeDescriptor::Tuple(components)) => {
                    if items.len() != components.len() {
                        return Err(MarshalError::arity(components.len(), items.len()));
                    }
                    push_front_all(&mut work, items, &components);
                }
                (value, descriptor) => {
                    let converted = self.convert_value(value, &descriptor)?;
                    wire.descriptors
                        .push(wire_descriptor(&descriptor, self.capabilities)?);
                    wire.values.push(converted);
                }
            }
        }

        Ok(wire)
    }

    /// Convert a value for a slot that holds exactly one wire value.
    fn convert_single(
        &self,
        value: Value,
        descriptor: &TypeDescriptor,
    ) -> Result<Value, MarshalError> {
        if !descriptor.is_spliced() {
            return self.convert_value(value, descriptor);
        }

        let mut wire = self.to_wire(vec![value], std::slice::from_ref(descriptor))?;
        match wire.values.len() {
            1 => Ok(wire.values.remove(0)),
            n => Err(MarshalError::type_mismatch(format!(
                "{descriptor} flattens to {n} values inside a container"
            ))),
        }
    }

    fn convert_value(&self, value: Value, descriptor: &TypeDescriptor) -> Result<Value, MarshalError> {
        match (value, descriptor) {
            (
                Value::Variant(variant),
                TypeDescriptor::TypeVariable(_) | TypeDescriptor::Primitive(PrimitiveKind::Variant),
            ) => self.convert_variant(variant),
            (
                value,
                TypeDescriptor::TypeVariable(_) | TypeDescriptor::Primitive(PrimitiveKind::Variant),
            ) => self.convert_variant(Variant::new(value)?),
            (
                Value::Object(object),
                TypeDescriptor::Interface(_) | TypeDescriptor::Primitive(PrimitiveKind::ObjectPath),
            ) => Ok(Value::ObjectPath(ObjectPath::new(
                self.resolver.export_path(&object)?,
            ))),
            (Value::ObjectPath(path), TypeDescriptor::Interface(_)) => Ok(Value::ObjectPath(path)),
            (Value::Types(types), TypeDescriptor::Primitive(PrimitiveKind::Signature)) => Ok(
                Value::Signature(signature::signature_of(&types, self.capabilities)?),
            ),
            (Value::Signature(text), TypeDescriptor::Primitive(PrimitiveKind::Signature)) => {
                signature::parse_signature(&text)?;
                Ok(Value::Signature(text))
            }
            (Value::Float(number), TypeDescriptor::Primitive(PrimitiveKind::Float)) => {
                if self.capabilities.float_support {
                    Ok(Value::Float(number))
                } else {
                    Ok(Value::Double(f64::from(number)))
                }
            }
            (Value::Bytes(bytes), TypeDescriptor::Array(element))
                if element.as_primitive() == Some(PrimitiveKind::Byte) =>
            {
                Ok(Value::Bytes(bytes))
            }
            (Value::Array(items), TypeDescriptor::Array(element)) => items
                .into_iter()
                .map(|item| self.convert_single(item, element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Value::Struct(value), TypeDescriptor::Struct(schema)) => {
                let wire = self.to_wire(value.fields, schema.fields())?;
                Ok(Value::Struct(StructValue {
                    name: value.name,
                    fields: wire.values,
                }))
            }
            (Value::Dict(entries), TypeDescriptor::Dict(key, value)) => entries
                .into_iter()
                .map(|(k, v)| Ok((self.convert_single(k, key)?, self.convert_single(v, value)?)))
                .collect::<Result<Vec<_>, MarshalError>>()
                .map(Value::Dict),
            (value, TypeDescriptor::Primitive(kind)) if primitive_matches(&value, *kind) => Ok(value),
            (value, descriptor) => Err(MarshalError::type_mismatch(format!(
                "Cannot marshal {} as {descriptor}",
                value.kind_name()
            ))),
        }
    }

    fn convert_variant(&self, variant: Variant) -> Result<Value, MarshalError> {
        let descriptor = variant.descriptor().clone();
        let wire = wire_descriptor(&descriptor, self.capabilities)?;
        let value = self.convert_single(variant.into_value(), &descriptor)?;
        Ok(Value::Variant(Variant::with_descriptor(wire, value)))
    }
}

fn push_front_all(
    work: &mut VecDeque<(Value, TypeDescriptor)>,
    values: Vec<Value>,
    descriptors: &[TypeDescriptor],
) {
    for pair in values.into_iter().zip(descriptors.iter().cloned()).rev() {
        work.push_front(pair);
    }
}
