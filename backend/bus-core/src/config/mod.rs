use crate::auth::mechanism::Mechanism;
use crate::error::config::ConfigError;
use crate::error::cookie::CookieError;
use crate::{DEFAULT_COOKIE_CONTEXT, KEYRING_DIR_NAME};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "bus.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    #[serde(default = "default_mechanisms")]
    pub server_mechanisms: Vec<Mechanism>,
    #[serde(default = "default_mechanisms")]
    pub client_mechanisms: Vec<Mechanism>,
    #[serde(default = "default_cookie_context")]
    pub cookie_context: String,
    #[serde(default = "default_cookie_lookup_timeout_ms")]
    pub cookie_lookup_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            server_mechanisms: default_mechanisms(),
            client_mechanisms: default_mechanisms(),
            cookie_context: default_cookie_context(),
            cookie_lookup_timeout_ms: default_cookie_lookup_timeout_ms(),
        }
    }
}

impl AuthConfig {
    pub fn cookie_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.cookie_lookup_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyringConfig {
    /// Overrides `~/.dbus-keyrings`.
    pub directory: Option<PathBuf>,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default = "default_expire_seconds")]
    pub expire_seconds: i64,
    #[serde(default = "default_max_time_travel_seconds")]
    pub max_time_travel_seconds: i64,
    #[serde(default = "default_prune_seconds")]
    pub prune_seconds: i64,
}

impl Default for KeyringConfig {
    fn default() -> Self {
        Self {
            directory: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            expire_seconds: default_expire_seconds(),
            max_time_travel_seconds: default_max_time_travel_seconds(),
            prune_seconds: default_prune_seconds(),
        }
    }
}

impl KeyringConfig {
    /// Keyring directory: the override if set, else `~/.dbus-keyrings`.
    #[track_caller]
    pub fn resolve_directory(&self) -> Result<PathBuf, CookieError> {
        if let Some(directory) = &self.directory {
            return Ok(directory.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(KEYRING_DIR_NAME))
            .ok_or_else(|| CookieError::HomeDirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
            })
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarshallingConfig {
    /// Send `Float` as `f` rather than widening it to `d`.
    #[serde(default)]
    pub float_support: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub keyring: KeyringConfig,

    #[serde(default)]
    pub marshalling: MarshallingConfig,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            auth: AuthConfig::default(),
            keyring: KeyringConfig::default(),
            marshalling: MarshallingConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_mechanisms() -> Vec<Mechanism> {
    Mechanism::PREFERENCE.to_vec()
}
fn default_cookie_context() -> String {
    DEFAULT_COOKIE_CONTEXT.to_string()
}
fn default_cookie_lookup_timeout_ms() -> u64 {
    1000
}
fn default_lock_timeout_ms() -> u64 {
    1000
}
fn default_expire_seconds() -> i64 {
    420
}
fn default_max_time_travel_seconds() -> i64 {
    300
}
fn default_prune_seconds() -> i64 {
    240
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BusConfig {
    /// Load config from {config_dir}/bus.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BusConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BusConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/bus.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Validation fails
    /// - Directory creation fails
    /// - Serialization fails
    /// - Write or rename fails
    #[track_caller]
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let location = ErrorLocation::from(Location::caller());
        let invalid = |reason: String| ConfigError::ValidationError { location, reason };

        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(invalid(format!(
                "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        if self.auth.server_mechanisms.is_empty() {
            return Err(invalid(String::from("server_mechanisms cannot be empty")));
        }

        if self.auth.client_mechanisms.is_empty() {
            return Err(invalid(String::from("client_mechanisms cannot be empty")));
        }

        if crate::cookie_store::validate_context(&self.auth.cookie_context).is_err() {
            return Err(invalid(format!(
                "Invalid cookie_context: '{}'",
                self.auth.cookie_context
            )));
        }

        let keyring = &self.keyring;
        if keyring.expire_seconds <= 0
            || keyring.max_time_travel_seconds < 0
            || keyring.prune_seconds <= 0
        {
            return Err(invalid(String::from(
                "Keyring windows must be positive (max_time_travel_seconds may be 0)",
            )));
        }

        if keyring.prune_seconds > keyring.expire_seconds {
            return Err(invalid(format!(
                "prune_seconds ({}) cannot exceed expire_seconds ({})",
                keyring.prune_seconds, keyring.expire_seconds
            )));
        }

        Ok(())
    }
}
