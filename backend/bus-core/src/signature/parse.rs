use crate::error::SignatureError;
use crate::signature::codes::{
    self, ARRAY, DICT_ENTRY_BEGIN, DICT_ENTRY_END, STRUCT_BEGIN, STRUCT_END,
};
use crate::signature::{Depth, MAX_SIGNATURE_LENGTH};

use models::{StructSchema, TypeDescriptor};

/// Decode descriptors from the start of `signature`.
///
/// At most `limit` top-level descriptors are read (`None` reads to the end).
/// Returns the descriptors and the number of bytes consumed.
pub fn from_signature(
    signature: &str,
    limit: Option<usize>,
) -> Result<(Vec<TypeDescriptor>, usize), SignatureError> {
    if signature.len() > MAX_SIGNATURE_LENGTH {
        return Err(SignatureError::limit_exceeded(format!(
            "Signature of {} bytes exceeds {MAX_SIGNATURE_LENGTH}",
            signature.len()
        )));
    }
    if !signature.is_ascii() {
        return Err(SignatureError::malformed(format!(
            "Signature '{signature}' contains non-ASCII characters"
        )));
    }

    let codes = signature.as_bytes();
    let mut descriptors = Vec::new();
    let mut position = 0;

    while position < codes.len() && limit.is_none_or(|limit| descriptors.len() < limit) {
        let (descriptor, next) = parse_one(codes, position, Depth::default())?;
        descriptors.push(descriptor);
        position = next;
    }

    Ok((descriptors, position))
}

/// Decode a complete signature; every byte must belong to a descriptor.
pub fn parse_signature(signature: &str) -> Result<Vec<TypeDescriptor>, SignatureError> {
    let (descriptors, consumed) = from_signature(signature, None)?;
    if consumed != signature.len() {
        return Err(SignatureError::malformed(format!(
            "Trailing characters after position {consumed} in '{signature}'"
        )));
    }
    Ok(descriptors)
}

/// Parse the single complete type starting at `position`.
fn parse_one(
    codes: &[u8],
    position: usize,
    depth: Depth,
) -> Result<(TypeDescriptor, usize), SignatureError> {
    let Some(&code) = codes.get(position) else {
        return Err(SignatureError::malformed("Signature ended where a type was expected"));
    };
    let code = char::from(code);

    match code {
        ARRAY => parse_array(codes, position + 1, depth.enter_array()?),
        STRUCT_BEGIN => parse_struct(codes, position + 1, depth.enter_struct()?),
        STRUCT_END | DICT_ENTRY_END => Err(SignatureError::malformed(format!(
            "Unbalanced '{code}' at position {position}"
        ))),
        DICT_ENTRY_BEGIN => Err(SignatureError::malformed(format!(
            "Dictionary entry outside an array at position {position}"
        ))),
        other => codes::primitive_for_code(other)
            .map(|kind| (TypeDescriptor::Primitive(kind), position + 1))
            .ok_or_else(|| {
                SignatureError::malformed(format!(
                    "Unknown type code '{other}' at position {position}"
                ))
            }),
    }
}

fn parse_array(
    codes: &[u8],
    position: usize,
    depth: Depth,
) -> Result<(TypeDescriptor, usize), SignatureError> {
    match codes.get(position).copied().map(char::from) {
        None => Err(SignatureError::malformed("Array is missing its element type")),
        Some(DICT_ENTRY_BEGIN) => {
            if matches!(
                codes.get(position + 1).copied().map(char::from),
                None | Some(DICT_ENTRY_END)
            ) {
                return Err(SignatureError::malformed("Dictionary is missing its key type"));
            }
            let (key, after_key) = parse_one(codes, position + 1, depth)?;
            if !key.as_primitive().is_some_and(|kind| kind.is_basic()) {
                return Err(SignatureError::malformed(format!(
                    "Dictionary key must be a basic type, got {key}"
                )));
            }
            if codes.get(after_key).copied().map(char::from) == Some(DICT_ENTRY_END) {
                return Err(SignatureError::malformed("Dictionary is missing its value type"));
            }
            let (value, after_value) = parse_one(codes, after_key, depth)?;
            match codes.get(after_value).copied().map(char::from) {
                Some(DICT_ENTRY_END) => Ok((
                    TypeDescriptor::Dict(Box::new(key), Box::new(value)),
                    after_value + 1,
                )),
                _ => Err(SignatureError::malformed(format!(
                    "Dictionary entry not closed by '{DICT_ENTRY_END}' at position {after_value}"
                ))),
            }
        }
        Some(_) => {
            let (element, next) = parse_one(codes, position, depth)?;
            Ok((TypeDescriptor::Array(Box::new(element)), next))
        }
    }
}

fn parse_struct(
    codes: &[u8],
    position: usize,
    depth: Depth,
) -> Result<(TypeDescriptor, usize), SignatureError> {
    let mut fields = Vec::new();
    let mut cursor = position;

    loop {
        match codes.get(cursor).copied().map(char::from) {
            None => {
                return Err(SignatureError::malformed(format!(
                    "Struct opened at position {} is never closed",
                    position - 1
                )));
            }
            Some(STRUCT_END) if fields.is_empty() => {
                return Err(SignatureError::malformed("Empty struct"));
            }
            Some(STRUCT_END) => {
                return Ok((
                    TypeDescriptor::Struct(StructSchema::anonymous(fields)),
                    cursor + 1,
                ));
            }
            Some(_) => {
                let (field, next) = parse_one(codes, cursor, depth)?;
                fields.push(field);
                cursor = next;
            }
        }
    }
}
