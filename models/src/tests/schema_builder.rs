use crate::{CustomSchemaBuilder, ModelError, PrimitiveKind, StructSchemaBuilder, TypeDescriptor};

/// **VALUE**: Wire order follows declared positions, not registration order.
///
/// **BUG THIS CATCHES**: Field order drifting with source order would silently
/// swap same-typed fields between peers.
#[test]
fn given_fields_registered_out_of_order_when_built_then_sorted_by_position() {
    // GIVEN
    let builder = StructSchemaBuilder::default()
        .with_name("Profile")
        .with_field(2, "active", PrimitiveKind::Boolean)
        .with_field(0, "name", PrimitiveKind::String)
        .with_field(1, "age", PrimitiveKind::UInt32);

    // WHEN
    let schema = builder.build().unwrap();

    // THEN
    assert_eq!(schema.name(), Some("Profile"));
    assert_eq!(
        schema.fields(),
        &[
            TypeDescriptor::Primitive(PrimitiveKind::String),
            TypeDescriptor::Primitive(PrimitiveKind::UInt32),
            TypeDescriptor::Primitive(PrimitiveKind::Boolean),
        ]
    );
    assert_eq!(schema.field_name(1), Some("age"));
}

#[test]
fn given_gap_in_positions_when_built_then_returns_validation_error() {
    let result = StructSchemaBuilder::default()
        .with_field(0, "a", PrimitiveKind::Int32)
        .with_field(2, "c", PrimitiveKind::Int32)
        .build();

    let err = result.unwrap_err();
    assert!(matches!(err, ModelError::Validation { .. }));
    assert!(err.to_string().contains("contiguous"));
}

#[test]
fn given_duplicate_field_names_when_built_then_returns_validation_error() {
    let result = StructSchemaBuilder::default()
        .with_field(0, "a", PrimitiveKind::Int32)
        .with_field(1, "a", PrimitiveKind::Int64)
        .build();

    assert!(result.unwrap_err().to_string().contains("Duplicate field name"));
}

#[test]
fn given_no_fields_when_built_then_returns_validation_error() {
    let result = StructSchemaBuilder::default().with_name("Empty").build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

#[test]
fn given_positional_fields_when_built_then_positions_follow_each_other() {
    let schema = StructSchemaBuilder::default()
        .with_positional(PrimitiveKind::Byte)
        .with_positional(PrimitiveKind::String)
        .build()
        .unwrap();

    assert_eq!(schema.len(), 2);
    assert_eq!(schema.field_name(0), None);
}

/// **VALUE**: Custom types flatten to native wire types only.
///
/// **BUG THIS CATCHES**: A custom shape that itself contains a custom type would
/// splice twice and desynchronise the argument list from the signature.
#[test]
fn given_nested_custom_shape_when_built_then_returns_validation_error() {
    // GIVEN
    let inner = CustomSchemaBuilder::default()
        .with_type_name("Inner")
        .with_wire_type(PrimitiveKind::Int32)
        .build()
        .unwrap();

    // WHEN
    let result = CustomSchemaBuilder::default()
        .with_type_name("Outer")
        .with_wire_type(inner)
        .build();

    // THEN
    assert!(result.unwrap_err().to_string().contains("native wire types"));
}

#[test]
fn given_custom_builder_without_name_when_built_then_returns_validation_error() {
    let result = CustomSchemaBuilder::default()
        .with_wire_type(PrimitiveKind::Int32)
        .build();

    assert!(result.unwrap_err().to_string().contains("name is required"));
}

#[test]
fn given_valid_custom_shape_when_built_then_arity_matches_shape() {
    let schema = CustomSchemaBuilder::default()
        .with_type_name("Temperature")
        .with_wire_types([
            PrimitiveKind::Double.into(),
            PrimitiveKind::String.into(),
        ])
        .build()
        .unwrap();

    assert_eq!(schema.type_name(), "Temperature");
    assert_eq!(schema.arity(), 2);
}
