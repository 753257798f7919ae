//! Single-character type codes of the wire type system.

use crate::signature::Capabilities;

use models::PrimitiveKind;

use const_format::concatcp;

pub const BOOLEAN: char = 'b';
pub const BYTE: char = 'y';
pub const INT16: char = 'n';
pub const UINT16: char = 'q';
pub const INT32: char = 'i';
pub const UINT32: char = 'u';
pub const INT64: char = 'x';
pub const UINT64: char = 't';
pub const DOUBLE: char = 'd';
pub const FLOAT: char = 'f';
pub const STRING: char = 's';
pub const OBJECT_PATH: char = 'o';
pub const SIGNATURE: char = 'g';
pub const UNIX_FD: char = 'h';
pub const VARIANT: char = 'v';

pub const ARRAY: char = 'a';
pub const STRUCT_BEGIN: char = '(';
pub const STRUCT_END: char = ')';
pub const DICT_ENTRY_BEGIN: char = '{';
pub const DICT_ENTRY_END: char = '}';

/// Prefix of every dictionary signature.
pub const DICT_BEGIN: &str = concatcp!(ARRAY, DICT_ENTRY_BEGIN);

/// Code of a primitive under the given capabilities.
pub fn primitive_code(kind: PrimitiveKind, capabilities: Capabilities) -> char {
    match kind {
        PrimitiveKind::Boolean => BOOLEAN,
        PrimitiveKind::Byte => BYTE,
        PrimitiveKind::Int16 => INT16,
        PrimitiveKind::UInt16 => UINT16,
        PrimitiveKind::Int32 => INT32,
        PrimitiveKind::UInt32 => UINT32,
        PrimitiveKind::Int64 => INT64,
        PrimitiveKind::UInt64 => UINT64,
        PrimitiveKind::Double => DOUBLE,
        PrimitiveKind::Float if capabilities.float_support => FLOAT,
        PrimitiveKind::Float => DOUBLE,
        PrimitiveKind::String => STRING,
        PrimitiveKind::ObjectPath => OBJECT_PATH,
        PrimitiveKind::Signature => SIGNATURE,
        PrimitiveKind::UnixFd => UNIX_FD,
        PrimitiveKind::Variant => VARIANT,
    }
}

pub fn primitive_for_code(code: char) -> Option<PrimitiveKind> {
    let kind = match code {
        BOOLEAN => PrimitiveKind::Boolean,
        BYTE => PrimitiveKind::Byte,
        INT16 => PrimitiveKind::Int16,
        UINT16 => PrimitiveKind::UInt16,
        INT32 => PrimitiveKind::Int32,
        UINT32 => PrimitiveKind::UInt32,
        INT64 => PrimitiveKind::Int64,
        UINT64 => PrimitiveKind::UInt64,
        DOUBLE => PrimitiveKind::Double,
        FLOAT => PrimitiveKind::Float,
        STRING => PrimitiveKind::String,
        OBJECT_PATH => PrimitiveKind::ObjectPath,
        SIGNATURE => PrimitiveKind::Signature,
        UNIX_FD => PrimitiveKind::UnixFd,
        VARIANT => PrimitiveKind::Variant,
        _ => return None,
    };
    Some(kind)
}
