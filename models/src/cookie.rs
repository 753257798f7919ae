//! One entry of a cookie keyring.

use crate::error::model_error::ModelError;
use crate::ErrorLocation;

use common::RedactedSecret;

use std::panic::Location;

/// A shared secret of the cookie authentication mechanism.
///
/// Serialized as one `id timestamp secret` line of the keyring file named
/// after `context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub context: String,
    pub id: String,
    pub created_at_seconds: i64,
    pub secret: RedactedSecret,
}

impl Cookie {
    pub fn new(
        context: impl Into<String>,
        id: impl Into<String>,
        created_at_seconds: i64,
        secret: RedactedSecret,
    ) -> Self {
        Self {
            context: context.into(),
            id: id.into(),
            created_at_seconds,
            secret,
        }
    }

    /// Parse one keyring line.
    #[track_caller]
    pub fn parse_line(context: &str, line: &str) -> Result<Self, ModelError> {
        let mut parts = line.split_whitespace();
        let (Some(id), Some(timestamp), Some(secret), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ModelError::Validation {
                message: String::from("Keyring line must have exactly three fields"),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let created_at_seconds = timestamp.parse::<i64>().map_err(|e| ModelError::Validation {
            message: format!("Invalid keyring timestamp '{timestamp}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self::new(
            context,
            id,
            created_at_seconds,
            RedactedSecret::new(secret),
        ))
    }

    /// Render as a keyring line (without newline).
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            self.id,
            self.created_at_seconds,
            self.secret.expose()
        )
    }

    /// Whether the cookie may be used at `now`.
    ///
    /// Negative timestamps, timestamps further in the future than
    /// `max_time_travel_seconds` and timestamps older than `expire_seconds` are
    /// all rejected.
    pub fn is_usable_at(&self, now: i64, max_time_travel_seconds: i64, expire_seconds: i64) -> bool {
        self.created_at_seconds >= 0
            && self.created_at_seconds <= now + max_time_travel_seconds
            && self.created_at_seconds >= now - expire_seconds
    }

    /// Whether a rewrite at `reference` should keep this entry.
    pub fn survives_prune(&self, reference: i64, prune_seconds: i64) -> bool {
        reference - self.created_at_seconds < prune_seconds
    }
}
