//! Explicit struct and custom-type schemas.
//!
//! A schema is the ordered list of wire slots a host type occupies. Struct
//! schemas keep their field positions fixed from construction on; custom
//! schemas describe how an application type flattens itself.

pub mod builder;

use crate::descriptor::TypeDescriptor;

use std::hash::{Hash, Hasher};

/// Ordered field list of a struct.
///
/// Equality and hashing look at the field descriptors only. The name and field
/// names are informational, so a schema decoded from a signature compares
/// equal to the named schema it was encoded from.
#[derive(Debug, Clone)]
pub struct StructSchema {
    name: Option<String>,
    field_names: Vec<Option<String>>,
    fields: Vec<TypeDescriptor>,
}

impl StructSchema {
    /// Positional schema without names, as produced by signature parsing.
    pub fn anonymous(fields: Vec<TypeDescriptor>) -> Self {
        Self {
            name: None,
            field_names: vec![None; fields.len()],
            fields,
        }
    }

    pub(crate) fn named(
        name: Option<String>,
        field_names: Vec<Option<String>>,
        fields: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            name,
            field_names,
            fields,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[TypeDescriptor] {
        &self.fields
    }

    pub fn field_name(&self, position: usize) -> Option<&str> {
        self.field_names.get(position).and_then(|n| n.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for StructSchema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for StructSchema {}

impl Hash for StructSchema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

/// Wire shape of an application-defined serializable type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomSchema {
    type_name: String,
    wire_shape: Vec<TypeDescriptor>,
}

impl CustomSchema {
    pub(crate) fn new(type_name: String, wire_shape: Vec<TypeDescriptor>) -> Self {
        Self {
            type_name,
            wire_shape,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn wire_shape(&self) -> &[TypeDescriptor] {
        &self.wire_shape
    }

    /// Number of wire values one instance occupies.
    pub fn arity(&self) -> usize {
        self.wire_shape.len()
    }
}
