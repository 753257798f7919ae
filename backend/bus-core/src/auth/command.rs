//! Lines of the SASL exchange.

use std::fmt;

/// One parsed SASL line.
///
/// Payloads stay hex-encoded here; mechanisms decode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Auth {
        mechanism: Option<String>,
        initial_response: Option<String>,
    },
    Data(String),
    Rejected(Vec<String>),
    Ok(String),
    Begin,
    Cancel,
    Error(Option<String>),
    /// Anything that is not a known command.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "AUTH" => {
                let mut parts = rest.split_whitespace();
                let mechanism = parts.next().map(str::to_string);
                let initial_response = parts.next().map(str::to_string);
                if parts.next().is_some() {
                    return Command::Invalid(line.to_string());
                }
                Command::Auth {
                    mechanism,
                    initial_response,
                }
            }
            "DATA" => Command::Data(rest.to_string()),
            "REJECTED" => Command::Rejected(rest.split_whitespace().map(str::to_string).collect()),
            "OK" if !rest.is_empty() => Command::Ok(rest.to_string()),
            "BEGIN" if rest.is_empty() => Command::Begin,
            "CANCEL" if rest.is_empty() => Command::Cancel,
            "ERROR" => Command::Error((!rest.is_empty()).then(|| rest.to_string())),
            _ => Command::Invalid(line.to_string()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Auth { .. } => "AUTH",
            Command::Data(_) => "DATA",
            Command::Rejected(_) => "REJECTED",
            Command::Ok(_) => "OK",
            Command::Begin => "BEGIN",
            Command::Cancel => "CANCEL",
            Command::Error(_) => "ERROR",
            Command::Invalid(_) => "INVALID",
        }
    }

    /// Form safe for logs: payloads are reported by length only.
    pub fn redacted(&self) -> String {
        match self {
            Command::Auth {
                mechanism,
                initial_response,
            } => format!(
                "AUTH {} ({} payload bytes)",
                mechanism.as_deref().unwrap_or("-"),
                initial_response.as_ref().map_or(0, String::len)
            ),
            Command::Data(payload) => format!("DATA ({} payload bytes)", payload.len()),
            Command::Invalid(line) => format!("INVALID ({} bytes)", line.len()),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Auth {
                mechanism,
                initial_response,
            } => {
                write!(f, "AUTH")?;
                if let Some(mechanism) = mechanism {
                    write!(f, " {mechanism}")?;
                    if let Some(data) = initial_response {
                        write!(f, " {data}")?;
                    }
                }
                Ok(())
            }
            Command::Data(payload) if payload.is_empty() => write!(f, "DATA"),
            Command::Data(payload) => write!(f, "DATA {payload}"),
            Command::Rejected(mechanisms) if mechanisms.is_empty() => write!(f, "REJECTED"),
            Command::Rejected(mechanisms) => write!(f, "REJECTED {}", mechanisms.join(" ")),
            Command::Ok(guid) => write!(f, "OK {guid}"),
            Command::Begin => write!(f, "BEGIN"),
            Command::Cancel => write!(f, "CANCEL"),
            Command::Error(None) => write!(f, "ERROR"),
            Command::Error(Some(message)) => write!(f, "ERROR {message}"),
            Command::Invalid(line) => write!(f, "{line}"),
        }
    }
}
