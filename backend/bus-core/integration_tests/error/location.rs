use bus_core::CoreError;
use bus_core::error::{AuthError, MarshalError, ObjectPathError, SignatureError, TransportError};
use bus_core::marshal::{ParameterConverter, PathResolver};
use bus_core::object_tree::ObjectTree;
use bus_core::signature::parse_signature;

use common::Located;
use models::{PrimitiveKind, TypeDescriptor, Value};

use std::io::{Error as IoError, ErrorKind};

/// **VALUE**: Signature errors point into the parser, where the bad code was met.
///
/// **WHY THIS MATTERS**: A malformed signature usually comes from a peer. The
/// location shows which rule refused it.
///
/// **BUG THIS CATCHES**: Would catch if someone:
/// - Removes `#[track_caller]` from the error constructors
/// - Breaks the Display implementation to not include location
#[test]
fn given_malformed_signature_when_parsed_then_error_includes_parser_location() {
    // GIVEN / WHEN
    let error = parse_signature("(ii").unwrap_err();

    // THEN
    assert!(matches!(error, SignatureError::Malformed { .. }));
    let message = error.to_string();
    assert!(message.contains("Malformed Signature Error"));
    assert!(message.contains("parse.rs"));
    assert_eq!(error.location().file_name(), "parse.rs");
}

#[test]
fn given_arity_mismatch_when_marshalled_then_error_includes_location() {
    let resolver = PathResolver;
    let converter = ParameterConverter::new(&resolver);

    let error = converter
        .to_wire(
            vec![Value::Int32(1)],
            &[
                TypeDescriptor::Primitive(PrimitiveKind::Int32),
                TypeDescriptor::Primitive(PrimitiveKind::Int32),
            ],
        )
        .unwrap_err();

    assert!(matches!(error, MarshalError::Arity { .. }));
    assert!(error.to_string().contains("Expected 2 values but got 1"));
    assert!(error.location().line > 0);
}

/// **VALUE**: Errors raised through `#[track_caller]` APIs point at the caller.
///
/// **BUG THIS CATCHES**: An error that always points into the library makes it
/// impossible to tell which registration in the application was invalid.
#[test]
fn given_invalid_object_path_when_added_then_error_points_at_caller() {
    let tree = ObjectTree::new();

    let error = tree.add("relative/path", (), None).unwrap_err();

    assert!(matches!(error, ObjectPathError::InvalidPath { .. }));
    assert_eq!(error.location().file_name(), "location.rs");
    assert!(error.to_string().contains("relative/path"));
}

#[test]
fn given_io_errors_when_converted_then_end_of_stream_is_distinguished() {
    let eof = TransportError::from(IoError::new(ErrorKind::UnexpectedEof, "closed"));
    let reset = TransportError::from(IoError::new(ErrorKind::ConnectionReset, "reset"));

    assert!(matches!(eof, TransportError::UnexpectedEof { .. }));
    assert!(matches!(reset, TransportError::Io { .. }));
    assert!(reset.to_string().contains("reset"));
    assert_eq!(eof.location().file_name(), "location.rs");
}

/// **VALUE**: The umbrella error displays exactly like the error it wraps.
#[test]
fn given_domain_error_when_wrapped_in_core_error_then_display_is_transparent() {
    let auth = AuthError::credentials_rejected("uid 1001 is not 1000");
    let expected = auth.to_string();

    let core: CoreError = auth.into();

    assert_eq!(core.to_string(), expected);
    assert!(expected.starts_with("Credentials Rejected Error: uid 1001 is not 1000 ["));
}

#[test]
fn given_hex_payload_error_when_converted_then_becomes_decode_error() {
    let error: AuthError = hex::decode("zz").unwrap_err().into();

    assert!(matches!(error, AuthError::Decode { .. }));
    assert!(error.to_string().contains("Invalid hex payload"));
}
