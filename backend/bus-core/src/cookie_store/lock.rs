//! Advisory `<context>.lock` file guarding keyring rewrites.
//!
//! The lock is taken by exclusive creation and released by deleting the file.
//! Acquisition gives up after the timeout; callers then write without it.
//! Stale lock files left by a crashed writer are not reclaimed.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};

const LOCK_INITIAL_INTERVAL: Duration = Duration::from_millis(10);
const LOCK_MAX_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub(crate) struct KeyringLock {
    path: PathBuf,
}

impl KeyringLock {
    /// Try to take the lock until `timeout` elapses.
    pub(crate) fn acquire(path: &Path, timeout: Duration) -> Option<Self> {
        let mut backoff = ExponentialBackoff {
            initial_interval: LOCK_INITIAL_INTERVAL,
            max_interval: LOCK_MAX_INTERVAL,
            max_elapsed_time: Some(timeout),
            ..Default::default()
        };

        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {
                    trace!("Acquired keyring lock {}", path.display());
                    return Some(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    warn!("Cannot create keyring lock {}: {e}", path.display());
                    return None;
                }
            }

            match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Keyring lock {} busy, retrying after {duration:?}", path.display());
                    sleep(duration);
                }
                None => {
                    warn!(
                        "Keyring lock {} still held after {timeout:?}, writing without it",
                        path.display()
                    );
                    return None;
                }
            }
        }
    }
}

impl Drop for KeyringLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Failed to release keyring lock {}: {e}", self.path.display());
        }
    }
}
