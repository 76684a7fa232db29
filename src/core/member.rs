use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a participant in one or more groups.
///
/// A member is usually a wallet address, but any stable string works:
/// the engine only compares identities, it never interprets them.
///
/// # Examples
///
/// ```
/// use group_ledger::core::member::MemberId;
///
/// let alice = MemberId::new("alice");
/// let bob = MemberId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this member ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
