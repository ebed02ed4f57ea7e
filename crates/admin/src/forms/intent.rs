//! Which button submitted the product form.
//!
//! Every interaction on the form posts the whole draft plus an `intent`
//! value naming the action to apply before the page is rendered again.

use std::str::FromStr;

use thiserror::Error;

use shopdesk_core::ListField;

/// Form field carrying the intent.
pub const INTENT_FIELD: &str = "intent";

/// An action requested by the product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    /// Validate and send the draft to the server action.
    Submit,
    /// Overwrite the slug from the current name.
    GenerateSlug,
    /// Commit one pending entry (`add:<field>`).
    AddEntry(ListField),
    /// Remove a committed entry (`remove:<field>:<value>`).
    RemoveEntry(ListField, String),
    /// Remove an image (`remove_image:<url>`).
    RemoveImage(String),
    /// Store the attached file and append its URL.
    UploadImage,
    /// Enter-key default: commit every non-empty pending entry.
    CommitPending,
}

/// Errors that can occur when parsing an intent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unknown form intent: {0}")]
    Unknown(String),

    #[error("unknown list field: {0}")]
    UnknownField(String),
}

impl FormIntent {
    /// Parse an optional posted intent; a missing or blank one is the
    /// default action.
    ///
    /// # Errors
    ///
    /// Returns `IntentError` for unrecognised values.
    pub fn from_posted(raw: Option<&str>) -> Result<Self, IntentError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::CommitPending),
            Some(value) => value.parse(),
        }
    }
}

impl FromStr for FormIntent {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit" => return Ok(Self::Submit),
            "generate_slug" => return Ok(Self::GenerateSlug),
            "upload_image" => return Ok(Self::UploadImage),
            "commit_pending" => return Ok(Self::CommitPending),
            _ => {}
        }

        if let Some(url) = s.strip_prefix("remove_image:") {
            return Ok(Self::RemoveImage(url.to_string()));
        }
        if let Some(field) = s.strip_prefix("add:") {
            return Ok(Self::AddEntry(parse_field(field)?));
        }

        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("remove"), Some(field), Some(value)) => {
                Ok(Self::RemoveEntry(parse_field(field)?, value.to_string()))
            }
            _ => Err(IntentError::Unknown(s.to_string())),
        }
    }
}

fn parse_field(raw: &str) -> Result<ListField, IntentError> {
    raw.parse()
        .map_err(|_| IntentError::UnknownField(raw.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_intents() {
        assert_eq!("submit".parse(), Ok(FormIntent::Submit));
        assert_eq!("generate_slug".parse(), Ok(FormIntent::GenerateSlug));
        assert_eq!("upload_image".parse(), Ok(FormIntent::UploadImage));
    }

    #[test]
    fn test_add_entry_intent() {
        assert_eq!("add:tags".parse(), Ok(FormIntent::AddEntry(ListField::Tags)));
        assert_eq!(
            "add:images".parse::<FormIntent>(),
            Err(IntentError::UnknownField("images".to_string()))
        );
    }

    #[test]
    fn test_remove_entry_keeps_colons_in_value() {
        assert_eq!(
            "remove:sizes:10:30".parse(),
            Ok(FormIntent::RemoveEntry(ListField::Sizes, "10:30".to_string()))
        );
    }

    #[test]
    fn test_remove_image_intent() {
        assert_eq!(
            "remove_image:/uploads/a.png".parse(),
            Ok(FormIntent::RemoveImage("/uploads/a.png".to_string()))
        );
    }

    #[test]
    fn test_missing_intent_is_default_action() {
        assert_eq!(FormIntent::from_posted(None), Ok(FormIntent::CommitPending));
        assert_eq!(FormIntent::from_posted(Some(" ")), Ok(FormIntent::CommitPending));
    }

    #[test]
    fn test_unknown_intent() {
        assert!(matches!(
            "publish".parse::<FormIntent>(),
            Err(IntentError::Unknown(_))
        ));
        assert!("remove:tags".parse::<FormIntent>().is_err());
    }
}
