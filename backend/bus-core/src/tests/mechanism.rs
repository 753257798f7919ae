use crate::auth::{Mechanism, Mechanisms};

#[test]
fn given_wire_names_when_parsed_then_known_mechanisms_round_trip() {
    for mechanism in Mechanism::PREFERENCE {
        assert_eq!(Mechanism::from_wire_name(mechanism.wire_name()), Some(mechanism));
    }
    assert_eq!(Mechanism::from_wire_name("KERBEROS_V4"), None);
    assert_eq!(Mechanism::from_wire_name("external"), None);
}

/// **VALUE**: Iteration follows the fixed client preference, not the order
/// a peer happened to list the names in.
///
/// **BUG THIS CATCHES**: A client that picks ANONYMOUS because the server
/// listed it first would authenticate with less than it could.
#[test]
fn given_rejected_list_in_any_order_when_parsed_then_preferred_order_is_used() {
    let offered = Mechanisms::from_wire_names(["ANONYMOUS", "UNKNOWN", "DBUS_COOKIE_SHA1"]);

    let order: Vec<Mechanism> = offered.preferred().collect();

    assert_eq!(order, vec![Mechanism::CookieSha1, Mechanism::Anonymous]);
    assert!(!offered.has(Mechanism::External));
    assert_eq!(offered.wire_names(), "DBUS_COOKIE_SHA1 ANONYMOUS");
}

#[test]
fn given_mechanism_list_when_collected_then_forms_set() {
    let set: Mechanisms = [Mechanism::External, Mechanism::Anonymous]
        .into_iter()
        .collect();

    assert_eq!(set, Mechanisms::EXTERNAL | Mechanisms::ANONYMOUS);
    assert_eq!(Mechanisms::default(), Mechanisms::empty());
}

#[test]
fn given_mechanism_when_serialized_then_uses_wire_name() {
    let json = serde_json::to_string(&Mechanism::CookieSha1).unwrap();
    let parsed: Mechanism = serde_json::from_str("\"EXTERNAL\"").unwrap();

    assert_eq!(json, "\"DBUS_COOKIE_SHA1\"");
    assert_eq!(parsed, Mechanism::External);
}
