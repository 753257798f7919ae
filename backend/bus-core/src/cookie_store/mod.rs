//! File keyring of the `DBUS_COOKIE_SHA1` mechanism.
//!
//! One file per context under the keyring directory, one `id timestamp secret`
//! line per cookie. The server appends cookies, the client looks them up.

mod lock;

use crate::config::KeyringConfig;
use crate::error::cookie::CookieError;

use common::ErrorLocation;
use models::Cookie;

use std::fs;
use std::io::{ErrorKind, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace, warn};
use tempfile::NamedTempFile;

use lock::KeyringLock;

const LOCK_FILE_SUFFIX: &str = ".lock";
const LOOKUP_INITIAL_INTERVAL: Duration = Duration::from_millis(5);
const LOOKUP_MAX_INTERVAL: Duration = Duration::from_millis(100);

/// Check a context name before it is used as a file name.
///
/// Contexts arrive from the peer during a handshake, so anything that could
/// escape the keyring directory is refused.
#[track_caller]
pub fn validate_context(context: &str) -> Result<(), CookieError> {
    let valid = !context.is_empty()
        && !context.starts_with('.')
        && !context
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());

    if valid {
        Ok(())
    } else {
        Err(CookieError::InvalidContext {
            location: ErrorLocation::from(Location::caller()),
            context: context.to_string(),
        })
    }
}

/// Seconds since the Unix epoch.
pub fn now_seconds() -> i64 {
    now_millis() / 1000
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct CookieStore {
    directory: PathBuf,
    lock_timeout: Duration,
    expire_seconds: i64,
    max_time_travel_seconds: i64,
    prune_seconds: i64,
}

impl CookieStore {
    /// Store rooted at `directory` with the default windows.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let defaults = KeyringConfig::default();
        Self {
            directory: directory.into(),
            lock_timeout: defaults.lock_timeout(),
            expire_seconds: defaults.expire_seconds,
            max_time_travel_seconds: defaults.max_time_travel_seconds,
            prune_seconds: defaults.prune_seconds,
        }
    }

    #[track_caller]
    pub fn from_config(config: &KeyringConfig) -> Result<Self, CookieError> {
        Ok(Self {
            directory: config.resolve_directory()?,
            lock_timeout: config.lock_timeout(),
            expire_seconds: config.expire_seconds,
            max_time_travel_seconds: config.max_time_travel_seconds,
            prune_seconds: config.prune_seconds,
        })
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn keyring_path(&self, context: &str) -> PathBuf {
        self.directory.join(context)
    }

    fn lock_path(&self, context: &str) -> PathBuf {
        self.directory.join(format!("{context}{LOCK_FILE_SUFFIX}"))
    }

    /// Find a usable cookie by id.
    ///
    /// Returns `None` when the keyring does not exist or holds no entry with
    /// that id inside the validity window. Malformed lines are skipped.
    #[track_caller]
    pub fn lookup(&self, context: &str, id: &str) -> Result<Option<Cookie>, CookieError> {
        validate_context(context)?;
        let now = now_seconds();

        let found = self.read_entries(context)?.into_iter().find(|cookie| {
            cookie.id == id
                && cookie.is_usable_at(now, self.max_time_travel_seconds, self.expire_seconds)
        });

        trace!(
            "Cookie {id} in context {context}: {}",
            if found.is_some() { "found" } else { "not found" }
        );
        Ok(found)
    }

    /// Poll [`lookup`](Self::lookup) until the cookie shows up or `timeout`
    /// elapses. Covers the window between the server announcing a cookie and
    /// its keyring write becoming visible.
    #[track_caller]
    pub fn lookup_with_retry(
        &self,
        context: &str,
        id: &str,
        timeout: Duration,
    ) -> Result<Option<Cookie>, CookieError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: LOOKUP_INITIAL_INTERVAL,
            max_interval: LOOKUP_MAX_INTERVAL,
            max_elapsed_time: Some(timeout),
            ..Default::default()
        };

        loop {
            if let Some(cookie) = self.lookup(context, id)? {
                return Ok(Some(cookie));
            }

            match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Cookie {id} not visible yet, retrying after {duration:?}");
                    sleep(duration);
                }
                None => {
                    debug!("Cookie {id} in context {context} not found within {timeout:?}");
                    return Ok(None);
                }
            }
        }
    }

    /// Add a cookie to its context's keyring.
    ///
    /// Entries older than the prune window relative to the new cookie are
    /// dropped in the same rewrite. The file is replaced atomically.
    #[track_caller]
    pub fn append(&self, cookie: &Cookie) -> Result<(), CookieError> {
        validate_context(&cookie.context)?;
        self.ensure_directory()?;

        let _lock = KeyringLock::acquire(&self.lock_path(&cookie.context), self.lock_timeout);

        let existing = self.read_entries(&cookie.context)?;
        let before = existing.len();
        let mut kept: Vec<Cookie> = existing
            .into_iter()
            .filter(|entry| entry.survives_prune(cookie.created_at_seconds, self.prune_seconds))
            .collect();
        if kept.len() < before {
            debug!(
                "Pruned {} expired cookies from context {}",
                before - kept.len(),
                cookie.context
            );
        }
        kept.push(cookie.clone());

        self.write_entries(&cookie.context, &kept)
    }

    #[track_caller]
    fn read_entries(&self, context: &str) -> Result<Vec<Cookie>, CookieError> {
        let path = self.keyring_path(context);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CookieError::Io {
                    location: ErrorLocation::from(Location::caller()),
                    path,
                    source: e,
                });
            }
        };

        let mut entries = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Cookie::parse_line(context, line) {
                Ok(cookie) => entries.push(cookie),
                Err(e) => warn!(
                    "Skipping malformed line {} of keyring {}: {e}",
                    number + 1,
                    path.display()
                ),
            }
        }
        Ok(entries)
    }

    #[track_caller]
    fn write_entries(&self, context: &str, entries: &[Cookie]) -> Result<(), CookieError> {
        let target = self.keyring_path(context);
        let location = ErrorLocation::from(Location::caller());
        let io_error = |path: &Path, source: std::io::Error| CookieError::Io {
            location,
            path: path.to_path_buf(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&self.directory)
            .map_err(|e| io_error(&self.directory, e))?;
        for entry in entries {
            writeln!(temp, "{}", entry.to_line()).map_err(|e| io_error(temp.path(), e))?;
        }
        temp.flush().map_err(|e| io_error(temp.path(), e))?;

        match temp.persist(&target) {
            Ok(_) => {}
            Err(persist) => {
                debug!(
                    "Atomic replace of {} failed ({}), removing and retrying",
                    target.display(),
                    persist.error
                );
                if let Err(e) = fs::remove_file(&target)
                    && e.kind() != ErrorKind::NotFound
                {
                    return Err(io_error(&target, e));
                }
                persist
                    .file
                    .persist(&target)
                    .map_err(|e| io_error(&target, e.error))?;
            }
        }

        trace!("Wrote {} cookies to {}", entries.len(), target.display());
        Ok(())
    }

    #[track_caller]
    fn ensure_directory(&self) -> Result<(), CookieError> {
        if self.directory.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.directory).map_err(|e| CookieError::Io {
            location: ErrorLocation::from(Location::caller()),
            path: self.directory.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(&self.directory, fs::Permissions::from_mode(0o700)).map_err(
                |e| CookieError::Io {
                    location: ErrorLocation::from(Location::caller()),
                    path: self.directory.clone(),
                    source: e,
                },
            )?;
        }

        info!("Created keyring directory {}", self.directory.display());
        Ok(())
    }
}
