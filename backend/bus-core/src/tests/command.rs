use crate::auth::Command;

/// **VALUE**: Every command the peer can send parses into its variant.
///
/// **BUG THIS CATCHES**: A parser that keys on the whole line instead of the
/// first word would treat `OK 1234` as invalid and stall the handshake.
#[test]
fn given_protocol_lines_when_parsed_then_yield_matching_commands() {
    let cases = [
        (
            "AUTH",
            Command::Auth {
                mechanism: None,
                initial_response: None,
            },
        ),
        (
            "AUTH EXTERNAL 31303030",
            Command::Auth {
                mechanism: Some(String::from("EXTERNAL")),
                initial_response: Some(String::from("31303030")),
            },
        ),
        ("DATA 6162", Command::Data(String::from("6162"))),
        ("DATA", Command::Data(String::new())),
        (
            "REJECTED EXTERNAL DBUS_COOKIE_SHA1",
            Command::Rejected(vec![
                String::from("EXTERNAL"),
                String::from("DBUS_COOKIE_SHA1"),
            ]),
        ),
        ("REJECTED", Command::Rejected(Vec::new())),
        ("OK 0123456789abcdef", Command::Ok(String::from("0123456789abcdef"))),
        ("BEGIN", Command::Begin),
        ("CANCEL", Command::Cancel),
        ("ERROR", Command::Error(None)),
        (
            "ERROR Unknown mechanism",
            Command::Error(Some(String::from("Unknown mechanism"))),
        ),
    ];

    for (line, expected) in cases {
        assert_eq!(Command::parse(line), expected, "line: {line}");
    }
}

#[test]
fn given_malformed_lines_when_parsed_then_yield_invalid() {
    for line in ["", "HELLO", "OK", "BEGIN now", "CANCEL it", "AUTH A B C", "auth EXTERNAL"] {
        assert!(
            matches!(Command::parse(line), Command::Invalid(_)),
            "'{line}' should be invalid"
        );
    }
}

#[test]
fn given_trailing_whitespace_when_parsed_then_it_is_ignored() {
    assert_eq!(Command::parse("BEGIN  "), Command::Begin);
    assert_eq!(
        Command::parse("DATA  abcd "),
        Command::Data(String::from("abcd"))
    );
}

/// **VALUE**: Rendering produces exactly the line the peer parses back.
#[test]
fn given_commands_when_displayed_then_render_wire_lines() {
    assert_eq!(
        Command::Auth {
            mechanism: Some(String::from("ANONYMOUS")),
            initial_response: None,
        }
        .to_string(),
        "AUTH ANONYMOUS"
    );
    assert_eq!(Command::Data(String::new()).to_string(), "DATA");
    assert_eq!(Command::Rejected(Vec::new()).to_string(), "REJECTED");
    assert_eq!(
        Command::Error(Some(String::from("Got invalid command"))).to_string(),
        "ERROR Got invalid command"
    );
    assert_eq!(Command::Ok(String::from("abc")).to_string(), "OK abc");
}

/// **VALUE**: Log output never carries mechanism payloads.
///
/// **WHY THIS MATTERS**: `DATA` lines of the cookie mechanism carry the hash
/// proving possession of a keyring secret.
#[test]
fn given_commands_with_payload_when_redacted_then_only_lengths_are_shown() {
    let data = Command::Data(String::from("deadbeefcafe"));
    let auth = Command::Auth {
        mechanism: Some(String::from("EXTERNAL")),
        initial_response: Some(String::from("31303030")),
    };

    assert_eq!(data.redacted(), "DATA (12 payload bytes)");
    assert_eq!(auth.redacted(), "AUTH EXTERNAL (8 payload bytes)");
    assert!(!data.redacted().contains("deadbeef"));
    assert_eq!(Command::Begin.redacted(), "BEGIN");
}
