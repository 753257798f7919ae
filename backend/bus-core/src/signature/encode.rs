use crate::error::SignatureError;
use crate::signature::codes::{
    self, DICT_BEGIN, DICT_ENTRY_END, OBJECT_PATH, STRUCT_BEGIN, STRUCT_END, VARIANT,
};
use crate::signature::{Capabilities, Depth, MAX_SIGNATURE_LENGTH, cache};

use models::TypeDescriptor;

/// Encode one descriptor as the sub-signatures of the wire values it occupies.
///
/// Plain types yield exactly one entry. Tuples and custom serializable types
/// yield one entry per component.
pub fn to_signature(
    descriptor: &TypeDescriptor,
    capabilities: Capabilities,
) -> Result<Vec<String>, SignatureError> {
    if let Some(encoded) = cache::lookup(descriptor, capabilities) {
        return Ok(encoded);
    }

    let encoded = encode(descriptor, capabilities, Depth::default())?;
    if let Some(long) = encoded.iter().find(|s| s.len() > MAX_SIGNATURE_LENGTH) {
        return Err(SignatureError::limit_exceeded(format!(
            "Signature of {} bytes exceeds {MAX_SIGNATURE_LENGTH}",
            long.len()
        )));
    }

    cache::insert(descriptor, capabilities, encoded.clone());
    Ok(encoded)
}

/// Concatenated signature of an argument list.
pub fn signature_of(
    descriptors: &[TypeDescriptor],
    capabilities: Capabilities,
) -> Result<String, SignatureError> {
    let mut signature = String::new();
    for descriptor in descriptors {
        for part in to_signature(descriptor, capabilities)? {
            signature.push_str(&part);
        }
    }

    if signature.len() > MAX_SIGNATURE_LENGTH {
        return Err(SignatureError::limit_exceeded(format!(
            "Signature of {} bytes exceeds {MAX_SIGNATURE_LENGTH}",
            signature.len()
        )));
    }
    Ok(signature)
}

fn encode(
    descriptor: &TypeDescriptor,
    capabilities: Capabilities,
    depth: Depth,
) -> Result<Vec<String>, SignatureError> {
    match descriptor {
        TypeDescriptor::Primitive(kind) => {
            Ok(vec![codes::primitive_code(*kind, capabilities).to_string()])
        }
        TypeDescriptor::Array(element) => {
            let element = single(element, capabilities, depth.enter_array()?, "Array element")?;
            Ok(vec![format!("{}{element}", codes::ARRAY)])
        }
        TypeDescriptor::Struct(schema) => {
            if schema.is_empty() {
                return Err(SignatureError::unrepresentable(
                    "Struct must have at least one field",
                ));
            }
            let depth = depth.enter_struct()?;
            let mut signature = String::from(STRUCT_BEGIN);
            for field in schema.fields() {
                for part in encode(field, capabilities, depth)? {
                    signature.push_str(&part);
                }
            }
            signature.push(STRUCT_END);
            Ok(vec![signature])
        }
        TypeDescriptor::Dict(key, value) => {
            let Some(kind) = key.as_primitive().filter(|k| k.is_basic()) else {
                return Err(SignatureError::unrepresentable(format!(
                    "Dictionary key must be a basic type, got {key}"
                )));
            };
            let depth = depth.enter_array()?;
            let value = single(value, capabilities, depth, "Dictionary value")?;
            Ok(vec![format!(
                "{DICT_BEGIN}{}{value}{DICT_ENTRY_END}",
                codes::primitive_code(kind, capabilities)
            )])
        }
        TypeDescriptor::CustomSerializable(schema) => {
            encode_all(schema.wire_shape(), capabilities, depth)
        }
        TypeDescriptor::Tuple(components) => encode_all(components, capabilities, depth),
        TypeDescriptor::TypeVariable(_) => Ok(vec![VARIANT.to_string()]),
        TypeDescriptor::Interface(_) => Ok(vec![OBJECT_PATH.to_string()]),
    }
}

fn encode_all(
    descriptors: &[TypeDescriptor],
    capabilities: Capabilities,
    depth: Depth,
) -> Result<Vec<String>, SignatureError> {
    let mut parts = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        parts.extend(encode(descriptor, capabilities, depth)?);
    }
    Ok(parts)
}

/// Encode a slot that must occupy exactly one wire value.
fn single(
    descriptor: &TypeDescriptor,
    capabilities: Capabilities,
    depth: Depth,
    what: &str,
) -> Result<String, SignatureError> {
    let mut parts = encode(descriptor, capabilities, depth)?;
    match parts.len() {
        1 => Ok(parts.remove(0)),
        n => Err(SignatureError::unrepresentable(format!(
            "{what} must encode to a single type, {descriptor} encodes to {n}"
        ))),
    }
}
