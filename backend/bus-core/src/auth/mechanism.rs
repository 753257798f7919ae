use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A SASL mechanism spoken by this implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    #[serde(rename = "EXTERNAL")]
    External,
    #[serde(rename = "DBUS_COOKIE_SHA1")]
    CookieSha1,
    #[serde(rename = "ANONYMOUS")]
    Anonymous,
}

impl Mechanism {
    /// Order in which a client tries mechanisms, whatever the server lists.
    pub const PREFERENCE: [Mechanism; 3] = [
        Mechanism::External,
        Mechanism::CookieSha1,
        Mechanism::Anonymous,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Mechanism::External => "EXTERNAL",
            Mechanism::CookieSha1 => "DBUS_COOKIE_SHA1",
            Mechanism::Anonymous => "ANONYMOUS",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|mechanism| mechanism.wire_name() == name)
    }

    pub fn flag(self) -> Mechanisms {
        match self {
            Mechanism::External => Mechanisms::EXTERNAL,
            Mechanism::CookieSha1 => Mechanisms::COOKIE_SHA1,
            Mechanism::Anonymous => Mechanisms::ANONYMOUS,
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

bitflags! {
    /// Set of mechanisms, as enabled locally or offered by a peer.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mechanisms: u8 {
        const EXTERNAL = 0b001;
        const COOKIE_SHA1 = 0b010;
        const ANONYMOUS = 0b100;
    }
}

impl Mechanisms {
    /// Members in client preference order.
    pub fn preferred(self) -> impl Iterator<Item = Mechanism> {
        Mechanism::PREFERENCE
            .into_iter()
            .filter(move |mechanism| self.contains(mechanism.flag()))
    }

    pub fn has(self, mechanism: Mechanism) -> bool {
        self.contains(mechanism.flag())
    }

    /// Parse a `REJECTED` list. Unknown names are ignored.
    pub fn from_wire_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .filter_map(Mechanism::from_wire_name)
            .map(Mechanism::flag)
            .collect()
    }

    /// Space separated names, as sent in `REJECTED`.
    pub fn wire_names(self) -> String {
        self.preferred()
            .map(Mechanism::wire_name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Mechanism> for Mechanisms {
    fn from_iter<I: IntoIterator<Item = Mechanism>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Mechanisms::empty(), |set, mechanism| set | mechanism.flag())
    }
}
