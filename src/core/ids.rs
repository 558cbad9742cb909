use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a transaction, unique within a batch.
///
/// Mirrors the newtype-over-`String` pattern used for every identifier
/// in this crate: cheap to clone, orderable, and never confused with a
/// plain string at the type level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(String);

impl TxnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TxnId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque identifier for an account (sender or receiver of a transaction).
///
/// # Examples
///
/// ```
/// use muling_graph_engine::core::ids::AccountId;
///
/// let a = AccountId::new("ACC-001");
/// let b = AccountId::new("ACC-002");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
