//! Identifiers for learners.

use serde::{Deserialize, Serialize};
use crate::error::CoreError;

/// Maximum length of a user identifier.
pub const MAX_USER_ID_LEN: usize = 128;

/// Identifier of a learner whose progression is tracked.
///
/// Restricted to ASCII letters, digits, `-` and `_`, which covers the UUIDs
/// issued by the auth backend and keeps the id usable as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a user identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_USER_ID_LEN {
            return Err(CoreError::InvalidUserId(id));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(CoreError::InvalidUserId(id));
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_uuid() {
        let id: UserId = "3f2b6c1e-8a4d-4e2f-9b7a-1c2d3e4f5a6b".parse().unwrap();
        assert_eq!(id.as_str(), "3f2b6c1e-8a4d-4e2f-9b7a-1c2d3e4f5a6b");
    }

    #[test]
    fn test_rejects_path_characters() {
        assert!(UserId::new("../etc/passwd").is_err());
        assert!(UserId::new("a b").is_err());
        assert!(UserId::new("").is_err());
        assert!(UserId::new("x".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: UserId = serde_json::from_str("\"learner_1\"").unwrap();
        assert_eq!(ok.to_string(), "learner_1");
        assert!(serde_json::from_str::<UserId>("\"no/slashes\"").is_err());
    }
}
