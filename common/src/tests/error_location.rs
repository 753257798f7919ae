use crate::ErrorLocation;
use std::panic::Location;

/// **VALUE**: Verifies that `ErrorLocation::from()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every signature, marshal, SASL and keyring error carries one
/// of these. If capture breaks, handshake failures can no longer be traced to the
/// state that raised them.
#[test]
#[track_caller]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN / WHEN
    let location = ErrorLocation::from(Location::caller());

    // THEN
    assert!(location.file.contains("error_location.rs"));
    assert!(location.line > 0);
    assert!(location.column > 0);
}

#[test]
#[track_caller]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    let location = ErrorLocation::from(Location::caller());

    let formatted = format!("{}", location);

    assert!(formatted.starts_with('['));
    assert!(formatted.ends_with(']'));
    assert!(formatted.contains(&location.line.to_string()));
    assert_eq!(formatted.matches(':').count(), 2, "Should have exactly 2 colons");
}

/// **VALUE**: Verifies `file_name()` strips directories.
///
/// **BUG THIS CATCHES**: Log lines that print the whole workspace path for every
/// rejected mechanism.
#[test]
fn given_nested_file_path_when_file_name_called_then_returns_last_component() {
    let location = ErrorLocation {
        file: "backend/bus-core/src/auth/client.rs",
        line: 10,
        column: 4,
    };

    assert_eq!(location.file_name(), "client.rs");
}

#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::from(Location::caller())
    }

    let loc1 = capture_location();
    let loc2 = capture_location();

    assert_eq!(loc1.file, loc2.file);
    assert_eq!(loc1.line + 1, loc2.line, "Lines should be sequential");
}
