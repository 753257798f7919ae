use crate::{ModelError, PrimitiveKind, StructSchema, StructSchemaBuilder, TypeDescriptor};

/// **VALUE**: Dictionary keys are restricted to basic types at construction.
///
/// **BUG THIS CATCHES**: A dict keyed by a variant or a container would produce
/// a signature the bus daemon rejects only after the message is on the wire.
#[test]
fn given_non_basic_key_when_dict_built_then_returns_validation_error() {
    // GIVEN
    let key = TypeDescriptor::array(PrimitiveKind::Byte);

    // WHEN
    let result = TypeDescriptor::dict(key, PrimitiveKind::String);

    // THEN
    assert!(matches!(result, Err(ModelError::Validation { .. })));
    assert!(TypeDescriptor::dict(PrimitiveKind::Variant, PrimitiveKind::String).is_err());
}

#[test]
fn given_basic_key_when_dict_built_then_descriptor_holds_both_sides() {
    let dict = TypeDescriptor::dict(PrimitiveKind::String, PrimitiveKind::Variant).unwrap();

    let TypeDescriptor::Dict(key, value) = dict else {
        panic!("Expected a dict descriptor");
    };
    assert_eq!(*key, TypeDescriptor::Primitive(PrimitiveKind::String));
    assert_eq!(*value, TypeDescriptor::Primitive(PrimitiveKind::Variant));
}

/// **VALUE**: Struct equality ignores names.
///
/// **WHY THIS MATTERS**: Signatures carry no field names, so a schema parsed back
/// from a signature has to compare equal to the named schema it came from.
#[test]
fn given_named_and_anonymous_schema_with_same_fields_when_compared_then_equal() {
    // GIVEN
    let named = StructSchemaBuilder::default()
        .with_name("Point")
        .with_field(0, "x", PrimitiveKind::Int32)
        .with_field(1, "y", PrimitiveKind::Int32)
        .build()
        .unwrap();
    let anonymous = StructSchema::anonymous(vec![
        PrimitiveKind::Int32.into(),
        PrimitiveKind::Int32.into(),
    ]);

    // THEN
    assert_eq!(
        TypeDescriptor::Struct(named),
        TypeDescriptor::Struct(anonymous)
    );
}

#[test]
fn given_descriptors_when_checked_for_splicing_then_only_tuple_and_custom_are_spliced() {
    assert!(TypeDescriptor::tuple(vec![PrimitiveKind::Int32.into()]).is_spliced());
    assert!(!TypeDescriptor::array(PrimitiveKind::Int32).is_spliced());
    assert!(!TypeDescriptor::type_variable("T").is_spliced());
    assert!(!TypeDescriptor::interface("org.example.Echo").is_spliced());
}

#[test]
fn given_nested_descriptor_when_displayed_then_shape_is_readable() {
    let descriptor = TypeDescriptor::array(
        TypeDescriptor::dict(PrimitiveKind::String, PrimitiveKind::Int32).unwrap(),
    );

    assert_eq!(descriptor.to_string(), "Array<Dict<String, Int32>>");
}
