//! Result of a product server action.

use serde::{Deserialize, Serialize};

/// Outcome reported by a server action.
///
/// Callers only trust the flag and the message; failures never carry a
/// typed error across this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the action committed.
    pub success: bool,
    /// Human readable outcome, shown to the user.
    pub message: String,
}

impl ActionResponse {
    /// A successful outcome.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
