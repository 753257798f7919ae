//! Type algebra between host descriptors and wire signatures.
//!
//! Encoding is one sub-signature per wire value: tuples and custom
//! serializable types are transparent and contribute one entry per component.
//! Decoding is a pure recursive descent over the signature string.

pub mod cache;
pub mod codes;

mod encode;
mod parse;

pub use encode::{signature_of, to_signature};
pub use parse::{from_signature, parse_signature};

use crate::config::MarshallingConfig;
use crate::error::SignatureError;

/// Longest signature the protocol allows, in bytes.
pub const MAX_SIGNATURE_LENGTH: usize = 255;

/// Deepest nesting of arrays, and separately of structs.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Optional wire features negotiated for a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Send single-precision floats as `f` instead of widening to `d`.
    pub float_support: bool,
}

impl Capabilities {
    pub fn with_float_support(mut self, enabled: bool) -> Self {
        self.float_support = enabled;
        self
    }
}

impl From<&MarshallingConfig> for Capabilities {
    fn from(config: &MarshallingConfig) -> Self {
        Self {
            float_support: config.float_support,
        }
    }
}

/// Container depth reached while encoding or decoding.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Depth {
    arrays: usize,
    structs: usize,
}

impl Depth {
    #[track_caller]
    pub(crate) fn enter_array(self) -> Result<Self, SignatureError> {
        let arrays = self.arrays + 1;
        if arrays > MAX_NESTING_DEPTH {
            return Err(SignatureError::limit_exceeded(format!(
                "Arrays nested deeper than {MAX_NESTING_DEPTH}"
            )));
        }
        Ok(Self { arrays, ..self })
    }

    #[track_caller]
    pub(crate) fn enter_struct(self) -> Result<Self, SignatureError> {
        let structs = self.structs + 1;
        if structs > MAX_NESTING_DEPTH {
            return Err(SignatureError::limit_exceeded(format!(
                "Structs nested deeper than {MAX_NESTING_DEPTH}"
            )));
        }
        Ok(Self { structs, ..self })
    }
}
