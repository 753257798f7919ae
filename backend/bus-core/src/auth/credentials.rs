//! Identity of the local process, as presented by `EXTERNAL` and
//! `DBUS_COOKIE_SHA1`.

/// Numeric user id of this process, when the platform exposes one.
#[cfg(unix)]
pub fn current_uid() -> Option<u32> {
    // SAFETY: getuid has no preconditions and cannot fail.
    Some(unsafe { libc::getuid() })
}

#[cfg(not(unix))]
pub fn current_uid() -> Option<u32> {
    None
}

/// Login name of this process.
pub fn current_username() -> String {
    whoami::username()
}
