use bus_core::marshal::{ParameterConverter, PathResolver};
use bus_core::signature::{Capabilities, parse_signature};

use models::{
    DBusSerializable, ErrorLocation, ModelError, PrimitiveKind, StructSchemaBuilder, StructValue,
    TypeDescriptor, Value,
};

use std::panic::Location;

#[derive(Debug, PartialEq)]
struct Version {
    major: u16,
    minor: u16,
}

impl DBusSerializable for Version {
    fn type_name() -> &'static str {
        "Version"
    }

    fn wire_shape() -> Vec<TypeDescriptor> {
        vec![PrimitiveKind::UInt16.into(), PrimitiveKind::UInt16.into()]
    }

    fn serialize(&self) -> Vec<Value> {
        vec![Value::UInt16(self.major), Value::UInt16(self.minor)]
    }

    fn deserialize(values: Vec<Value>) -> Result<Self, ModelError> {
        match values.as_slice() {
            [Value::UInt16(major), Value::UInt16(minor)] => Ok(Self {
                major: *major,
                minor: *minor,
            }),
            _ => Err(ModelError::Conversion {
                message: String::from("Version expects (uint16, uint16)"),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// **VALUE**: A struct argument survives the trip through its body signature.
///
/// **WHY THIS MATTERS**: The receiving side only has the signature string. If
/// the parsed descriptor does not line up with the values, every struct
/// argument arrives scrambled.
#[test]
fn given_struct_argument_when_sent_and_received_via_signature_then_values_are_preserved() {
    // GIVEN
    let resolver = PathResolver;
    let converter = ParameterConverter::new(&resolver);
    let schema = StructSchemaBuilder::default()
        .with_name("Entry")
        .with_field(0, "key", PrimitiveKind::String)
        .with_field(1, "count", PrimitiveKind::UInt32)
        .with_field(2, "delta", PrimitiveKind::Int64)
        .build()
        .unwrap();
    let value = Value::Struct(StructValue::new(vec![
        Value::str("x"),
        Value::UInt32(7),
        Value::Int64(-5),
    ]));

    // WHEN
    let wire = converter
        .to_wire(vec![value.clone()], &[TypeDescriptor::Struct(schema)])
        .unwrap();
    let signature = wire.signature(Capabilities::default()).unwrap();
    let received_types = parse_signature(&signature).unwrap();
    let received = converter
        .from_wire_parameters(wire.values, &received_types)
        .unwrap();

    // THEN
    assert_eq!(signature, "(sux)");
    assert_eq!(received, vec![value]);
}

/// **VALUE**: Dictionaries with free value types travel as `a{sv}` and come
/// back unwrapped.
#[test]
fn given_property_map_when_round_tripped_then_variants_are_transparent() {
    let resolver = PathResolver;
    let converter = ParameterConverter::new(&resolver);
    let descriptor =
        TypeDescriptor::dict(PrimitiveKind::String, TypeDescriptor::type_variable("V")).unwrap();
    let properties = Value::Dict(vec![
        (Value::str("volume"), Value::UInt32(7)),
        (Value::str("name"), Value::str("kitchen")),
        (Value::str("muted"), Value::Bool(false)),
    ]);

    let wire = converter
        .to_wire(vec![properties.clone()], std::slice::from_ref(&descriptor))
        .unwrap();
    let received = converter
        .from_wire_parameters(wire.values.clone(), &[descriptor])
        .unwrap();

    assert_eq!(wire.signature(Capabilities::default()).unwrap(), "a{sv}");
    assert_eq!(received, vec![properties]);
}

/// **VALUE**: Multiple return values with a custom type flatten and regroup.
///
/// **BUG THIS CATCHES**: Off-by-one slicing when a custom type sits after a
/// plain value in a tuple.
#[test]
fn given_tuple_with_custom_component_when_round_tripped_then_regrouped() {
    // GIVEN
    let resolver = PathResolver;
    let converter = ParameterConverter::new(&resolver);
    let version = Version { major: 1, minor: 12 };
    let returns = TypeDescriptor::tuple(vec![
        PrimitiveKind::String.into(),
        Version::descriptor().unwrap(),
    ]);

    // WHEN
    let wire = converter
        .to_wire(
            vec![Value::Tuple(vec![Value::str("bus"), version.to_value()])],
            std::slice::from_ref(&returns),
        )
        .unwrap();
    let mut received = converter
        .from_wire_parameters(wire.values.clone(), &[returns])
        .unwrap();

    // THEN
    assert_eq!(wire.signature(Capabilities::default()).unwrap(), "sqq");
    assert_eq!(received.len(), 2);
    let Value::Custom(custom) = received.remove(1) else {
        panic!("Expected a custom value");
    };
    assert_eq!(custom.decode::<Version>().unwrap(), version);
    assert_eq!(received, vec![Value::str("bus")]);
}

#[test]
fn given_byte_array_when_round_tripped_then_stays_compact() {
    let resolver = PathResolver;
    let converter = ParameterConverter::new(&resolver);
    let descriptor = TypeDescriptor::array(PrimitiveKind::Byte);

    let wire = converter
        .to_wire(
            vec![Value::Bytes(vec![0, 1, 254, 255])],
            std::slice::from_ref(&descriptor),
        )
        .unwrap();
    let received = converter
        .from_wire_parameters(wire.values, &[descriptor])
        .unwrap();

    assert_eq!(received, vec![Value::Bytes(vec![0, 1, 254, 255])]);
}
