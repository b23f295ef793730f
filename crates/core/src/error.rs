//! Errors raised by the core model.

/// Errors that can occur when constructing core values.
///
/// The progression operations themselves are total; only input validation
/// at the boundary can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// User identifier is empty, too long, or contains disallowed characters
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    /// Level curve parameters are unusable
    #[error("invalid level curve: {0}")]
    InvalidCurve(String),
}
