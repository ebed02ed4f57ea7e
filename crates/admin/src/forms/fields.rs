//! Decoding the posted product form.
//!
//! Lists travel as repeated inputs with the same name, so fields are
//! collected into name → values before the draft is rebuilt.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use thiserror::Error;

use shopdesk_core::{
    ListField, MAX_RATING_BUCKETS, ProductDraft, ProductId, RatingBucket, ReviewStats,
};

use super::intent::{FormIntent, INTENT_FIELD, IntentError};
use super::product_form::PendingEntries;
use crate::error::AppError;
use crate::services::uploads::{ImageUpload, UploadError};

/// Name of the file input.
pub const IMAGE_FIELD: &str = "image";

/// Errors that can occur while decoding a form post.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Intent(#[from] IntentError),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// The file part as it was read.
#[derive(Debug)]
enum PostedImage {
    File(ImageUpload),
    TooLarge { max_bytes: usize },
}

/// Every value posted by the product form.
#[derive(Debug, Default)]
pub struct FormFields {
    values: HashMap<String, Vec<String>>,
    image: Option<PostedImage>,
    truncated: bool,
}

impl FormFields {
    /// Read the whole multipart body.
    ///
    /// An image larger than `max_image_bytes` is drained and dropped. A
    /// body cut off by the request size limit keeps every field that
    /// arrived before the cut and reports the image as too large.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Multipart` if the body cannot be decoded.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_image_bytes: usize,
    ) -> Result<Self, FormError> {
        let mut fields = Self::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => return fields.cut_off(e, max_image_bytes),
            };
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                match read_image(field, max_image_bytes).await {
                    Ok(image) => fields.image = image,
                    Err(e) => return fields.cut_off(e, max_image_bytes),
                }
                continue;
            }

            match field.text().await {
                Ok(value) => fields.push(name, value),
                Err(e) => return fields.cut_off(e, max_image_bytes),
            }
        }

        Ok(fields)
    }

    fn cut_off(mut self, err: MultipartError, max_bytes: usize) -> Result<Self, FormError> {
        if err.status() != StatusCode::PAYLOAD_TOO_LARGE {
            return Err(err.into());
        }
        tracing::warn!(max_bytes, "form body exceeded the request size limit");
        self.truncated = true;
        self.image = Some(PostedImage::TooLarge { max_bytes });
        Ok(self)
    }

    /// Add a value; used when building posts by hand.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// First value posted under `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values posted under `name`, in order.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<String> {
        self.values.get(name).cloned().unwrap_or_default()
    }

    /// The attached file.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Empty` when no file was chosen and
    /// `UploadError::TooLarge` when it was dropped while reading.
    pub fn take_image(&mut self) -> Result<ImageUpload, UploadError> {
        match self.image.take() {
            Some(PostedImage::File(file)) => Ok(file),
            Some(PostedImage::TooLarge { max_bytes }) => Err(UploadError::TooLarge { max_bytes }),
            None => Err(UploadError::Empty),
        }
    }

    /// Which button submitted the form.
    ///
    /// Only a file can push a body past the size limit, so a cut-off body
    /// is treated as an upload.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Intent` for an unrecognised intent.
    pub fn intent(&self) -> Result<FormIntent, FormError> {
        if self.truncated {
            return Ok(FormIntent::UploadImage);
        }
        Ok(FormIntent::from_posted(self.first(INTENT_FIELD))?)
    }

    /// Identity key carried by the edit form; blank means none.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidValue` if the value is not an ID.
    pub fn product_id(&self) -> Result<Option<ProductId>, FormError> {
        match self.first("product_id").map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| FormError::InvalidValue {
                    field: "product_id",
                    value: raw.to_string(),
                }),
        }
    }

    /// Text typed into the pending boxes.
    #[must_use]
    pub fn pending(&self) -> PendingEntries {
        let get = |field| self.text(PendingEntries::field_name(field));
        PendingEntries {
            size: get(ListField::Sizes),
            color: get(ListField::Colors),
            tag: get(ListField::Tags),
        }
    }

    /// Rebuild the draft exactly as the user left it.
    ///
    /// # Errors
    ///
    /// Returns `FormError::InvalidValue` if the hidden review aggregates
    /// were tampered with.
    pub fn draft(&self) -> Result<ProductDraft, FormError> {
        Ok(ProductDraft {
            name: self.text("name"),
            slug: self.text("slug"),
            category: self.text("category"),
            brand: self.text("brand"),
            description: self.text("description"),
            price: self.text("price"),
            list_price: self.text("list_price"),
            count_in_stock: self.text("count_in_stock"),
            is_published: self
                .first("is_published")
                .is_some_and(|v| matches!(v, "on" | "true")),
            images: self.all("images"),
            sizes: self.all(ListField::Sizes.as_str()),
            colors: self.all(ListField::Colors.as_str()),
            tags: self.all(ListField::Tags.as_str()),
            reviews: self.reviews()?,
        })
    }

    fn text(&self, name: &str) -> String {
        self.first(name).unwrap_or_default().to_string()
    }

    fn reviews(&self) -> Result<ReviewStats, FormError> {
        let rating_distribution = match self.first("rating_distribution").map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<RatingBucket>>(raw)
                .ok()
                .filter(|buckets| buckets.len() <= MAX_RATING_BUCKETS)
                .ok_or_else(|| FormError::InvalidValue {
                    field: "rating_distribution",
                    value: raw.to_string(),
                })?,
        };

        Ok(ReviewStats {
            num_reviews: self.number("num_reviews")?,
            avg_rating: self.number::<Decimal>("avg_rating")?,
            num_sales: self.number("num_sales")?,
            rating_distribution,
        })
    }

    /// Parse a hidden numeric field; missing means zero.
    fn number<T: FromStr + Default>(&self, name: &'static str) -> Result<T, FormError> {
        match self.first(name).map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(raw) => raw.parse().map_err(|_| FormError::InvalidValue {
                field: name,
                value: raw.to_string(),
            }),
        }
    }
}

/// Read the file part chunk by chunk, keeping at most `max_bytes`.
async fn read_image(
    mut field: Field<'_>,
    max_bytes: usize,
) -> Result<Option<PostedImage>, MultipartError> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);

    let mut bytes = Vec::new();
    let mut too_large = false;
    while let Some(chunk) = field.chunk().await? {
        if too_large {
            continue;
        }
        if bytes.len() + chunk.len() > max_bytes {
            too_large = true;
            bytes = Vec::new();
        } else {
            bytes.extend_from_slice(&chunk);
        }
    }

    if too_large {
        return Ok(Some(PostedImage::TooLarge { max_bytes }));
    }
    // An untouched file input posts an empty part with no name
    if file_name.as_deref().is_some_and(|n| !n.is_empty()) || !bytes.is_empty() {
        return Ok(Some(PostedImage::File(ImageUpload {
            file_name,
            content_type,
            bytes,
        })));
    }
    Ok(None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn posted(pairs: &[(&str, &str)]) -> FormFields {
        let mut fields = FormFields::default();
        for (name, value) in pairs {
            fields.push(*name, *value);
        }
        fields
    }

    #[test]
    fn test_draft_keeps_raw_text_and_lists() {
        let fields = posted(&[
            ("name", "Red Shoe"),
            ("price", "abc"),
            ("sizes", "S"),
            ("sizes", "M"),
            ("images", "/uploads/a.png"),
            ("is_published", "on"),
        ]);
        let draft = fields.draft().unwrap();
        assert_eq!(draft.name, "Red Shoe");
        assert_eq!(draft.price, "abc");
        assert_eq!(draft.sizes, vec!["S", "M"]);
        assert_eq!(draft.images, vec!["/uploads/a.png"]);
        assert!(draft.is_published);
        assert!(!posted(&[]).draft().unwrap().is_published);
    }

    #[test]
    fn test_review_aggregates_round_trip_through_hidden_fields() {
        let fields = posted(&[
            ("num_reviews", "4"),
            ("avg_rating", "4.5"),
            ("num_sales", "12"),
            ("rating_distribution", r#"[{"rating":5,"count":2},{"rating":4,"count":2}]"#),
        ]);
        let reviews = fields.draft().unwrap().reviews;
        assert_eq!(reviews.num_reviews, 4);
        assert_eq!(reviews.avg_rating, Decimal::new(45, 1));
        assert_eq!(reviews.rating_distribution.len(), 2);
    }

    #[test]
    fn test_tampered_review_fields_are_rejected() {
        let fields = posted(&[("num_reviews", "lots")]);
        assert!(matches!(
            fields.draft().unwrap_err(),
            FormError::InvalidValue {
                field: "num_reviews",
                ..
            }
        ));
    }

    #[test]
    fn test_rating_distribution_longer_than_five_buckets_is_rejected() {
        let bucket = r#"{"rating":5,"count":1}"#;
        let raw = format!("[{}]", vec![bucket; 6].join(","));
        let fields = posted(&[("rating_distribution", raw.as_str())]);
        assert!(matches!(
            fields.draft().unwrap_err(),
            FormError::InvalidValue {
                field: "rating_distribution",
                ..
            }
        ));
    }

    #[test]
    fn test_product_id() {
        assert_eq!(posted(&[]).product_id().unwrap(), None);
        assert_eq!(posted(&[("product_id", "")]).product_id().unwrap(), None);
        assert_eq!(
            posted(&[("product_id", "12")]).product_id().unwrap(),
            Some(ProductId::new(12))
        );
        assert!(posted(&[("product_id", "x")]).product_id().is_err());
    }

    #[test]
    fn test_pending_entries() {
        let pending = posted(&[("pending_color", "Blue")]).pending();
        assert_eq!(pending.get(ListField::Colors), "Blue");
        assert_eq!(pending.get(ListField::Sizes), "");
    }

    #[test]
    fn test_missing_image_is_empty_upload() {
        let err = posted(&[]).take_image().unwrap_err();
        assert!(matches!(err, UploadError::Empty));
    }

    #[test]
    fn test_intent_defaults_to_commit_pending() {
        assert_eq!(posted(&[]).intent().unwrap(), FormIntent::CommitPending);
        assert!(posted(&[("intent", "explode")]).intent().is_err());
    }
}
