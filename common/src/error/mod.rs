pub mod error_location;
pub mod redact_error;

use error_location::ErrorLocation;

/// Errors that remember where they were raised.
///
/// Every error enum in the workspace stores an [`ErrorLocation`] in each
/// variant; this trait exposes it without matching on the variant.
pub trait Located {
    fn location(&self) -> ErrorLocation;
}
