//! Toast notifications and one-shot session flashes.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

impl ToastVariant {
    /// CSS modifier class for the toast element.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Default => "toast",
            Self::Destructive => "toast toast-destructive",
        }
    }
}

/// A message shown once at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub variant: ToastVariant,
    pub description: String,
}

impl Toast {
    #[must_use]
    pub fn info(description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Default,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn destructive(description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            description: description.into(),
        }
    }

    /// Whether this toast reports a failure.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.variant == ToastVariant::Destructive
    }

    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        self.variant.css_class()
    }
}

/// Store a toast for the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(session: &Session, toast: &Toast) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, toast).await
}

/// Take the pending flash, if any. It is removed from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn take_flash(session: &Session) -> Result<Option<Toast>, tower_sessions::session::Error> {
    session.remove::<Toast>(session_keys::FLASH).await
}
