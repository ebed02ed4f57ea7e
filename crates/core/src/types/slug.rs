//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input is shorter than the minimum length.
    #[error("slug must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than the maximum length.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that is not URL-safe.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A URL-safe product slug.
///
/// ## Constraints
///
/// - Length: 3-200 characters
/// - Only lowercase ASCII letters, digits, `-` and `_`
///
/// ## Examples
///
/// ```
/// use shopdesk_core::Slug;
///
/// assert!(Slug::parse("red-running-shoe").is_ok());
/// assert!(Slug::parse("ab").is_err());            // too short
/// assert!(Slug::parse("Red Shoe").is_err());      // uppercase and space
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Minimum length of a slug.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is too short, too long, or contains a
    /// character outside `[a-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if let Some(c) = s.chars().find(|c| !is_slug_char(*c)) {
            return Err(SlugError::InvalidCharacter(c));
        }

        if s.len() < Self::MIN_LENGTH {
            return Err(SlugError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the slug, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Derive a slug from free text such as a product name.
///
/// Lowercases the text, drops everything except ASCII letters, digits,
/// underscores, hyphens and whitespace, then joins the remaining words with
/// single hyphens. Leading and trailing separators are removed.
///
/// ```
/// use shopdesk_core::to_slug;
///
/// assert_eq!(to_slug("Red Running Shoe"), "red-running-shoe");
/// assert_eq!(to_slug("  Tee -- Size L! "), "tee-size-l");
/// ```
#[must_use]
pub fn to_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            separator = true;
        }
    }

    slug
}
