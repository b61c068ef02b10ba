//! Common identifier types for aiaction-core

use serde::{Deserialize, Serialize};
use std::fmt;

/// NewType pattern for User ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NewType pattern for Context ID
///
/// A context is the place an action was requested from (a course, a module,
/// a user's own area).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(i64);

impl ContextId {
    /// Create a new ContextId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ContextId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NewType pattern for an action register row ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRecordId(i64);

impl ActionRecordId {
    /// Create from an existing row id
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ActionRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
