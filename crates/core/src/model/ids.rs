use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::progress::ProgressError;

/// Opaque identifier of a learner.
///
/// Stored exactly as given. Only an identifier that is empty or all
/// whitespace is rejected.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validates and wraps a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyUserId` if the identifier is blank.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ProgressError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ProgressError::EmptyUserId);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = ProgressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
