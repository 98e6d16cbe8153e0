// finops-core/src/domain/resource/removal.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to a resource when its stack is deleted or the resource is replaced.
///
/// There is deliberately no `Default`: every descriptor states its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// The resource outlives the stack (billing history).
    Retain,
    /// The resource is destroyed with the stack (disposable credentials, logs).
    Delete,
}

impl RemovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retain => "Retain",
            Self::Delete => "Delete",
        }
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, Self::Retain)
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
