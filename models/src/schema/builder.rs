use crate::error::model_error::ModelError;
use crate::schema::{CustomSchema, StructSchema};
use crate::{ErrorLocation, TypeDescriptor};

use std::collections::HashSet;
use std::panic::Location;

/// Builder for validated struct schemas.
///
/// Fields are registered with an explicit position, so declaration order in
/// code does not decide wire order.
///
/// ```
/// use models::{PrimitiveKind, StructSchemaBuilder};
///
/// let schema = StructSchemaBuilder::default()
///     .with_name("Profile")
///     .with_field(1, "age", PrimitiveKind::UInt32)
///     .with_field(0, "name", PrimitiveKind::String)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.field_name(0), Some("name"));
/// ```
#[derive(Debug, Default)]
pub struct StructSchemaBuilder {
    name: Option<String>,
    fields: Vec<(usize, Option<String>, TypeDescriptor)>,
}

impl StructSchemaBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(
        mut self,
        position: usize,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> Self {
        self.fields
            .push((position, Some(name.into()), descriptor.into()));
        self
    }

    /// Append an unnamed field after the highest position registered so far.
    pub fn with_positional(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        let position = self
            .fields
            .iter()
            .map(|(position, _, _)| position + 1)
            .max()
            .unwrap_or(0);
        self.fields.push((position, None, descriptor.into()));
        self
    }

    /// Build the schema with validation.
    #[track_caller]
    pub fn build(self) -> Result<StructSchema, ModelError> {
        if let Some(name) = &self.name
            && name.is_empty()
        {
            return Err(ModelError::Validation {
                message: String::from("Struct name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.fields.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Struct must declare at least one field"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut fields = self.fields;
        fields.sort_by_key(|(position, _, _)| *position);

        for (expected, (position, _, _)) in fields.iter().enumerate() {
            if *position != expected {
                return Err(ModelError::Validation {
                    message: format!(
                        "Field positions must be contiguous from 0: expected {expected}, found {position}"
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let mut seen = HashSet::new();
        for (_, name, _) in &fields {
            if let Some(name) = name
                && !seen.insert(name.as_str())
            {
                return Err(ModelError::Validation {
                    message: format!("Duplicate field name: {name}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        let (field_names, descriptors) = fields
            .into_iter()
            .map(|(_, name, descriptor)| (name, descriptor))
            .unzip();

        Ok(StructSchema::named(self.name, field_names, descriptors))
    }
}

/// Builder for custom serializable schemas.
#[derive(Debug, Default)]
pub struct CustomSchemaBuilder {
    type_name: Option<String>,
    wire_shape: Vec<TypeDescriptor>,
}

impl CustomSchemaBuilder {
    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    pub fn with_wire_type(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.wire_shape.push(descriptor.into());
        self
    }

    pub fn with_wire_types(mut self, descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        self.wire_shape.extend(descriptors);
        self
    }

    #[track_caller]
    pub fn build(self) -> Result<CustomSchema, ModelError> {
        let type_name = self.type_name.ok_or_else(|| ModelError::Validation {
            message: String::from("Custom type name is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if type_name.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Custom type name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.wire_shape.is_empty() {
            return Err(ModelError::Validation {
                message: format!("Custom type {type_name} must serialize to at least one wire value"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(nested) = self.wire_shape.iter().find(|d| d.is_spliced()) {
            return Err(ModelError::Validation {
                message: format!(
                    "Custom type {type_name} must serialize to native wire types, found {nested}"
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(CustomSchema::new(type_name, self.wire_shape))
    }
}
