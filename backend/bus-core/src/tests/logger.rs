use crate::logger::{LOG_FILE_NAME, initialize};

use tempfile::TempDir;

/// **VALUE**: Initializing twice is harmless.
///
/// **WHY THIS MATTERS**: Client and server endpoints in one process both set
/// up logging. A second global logger would make fern fail at startup.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are
/// removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN
    let dir = TempDir::new().unwrap();

    // WHEN
    let first = initialize(dir.path());
    let second = initialize(dir.path());

    // THEN
    assert!(first.is_ok(), "First initialization should succeed: {first:?}");
    assert!(second.is_ok(), "Second initialization should be a no-op");
    assert!(dir.path().join(LOG_FILE_NAME).exists());
}
