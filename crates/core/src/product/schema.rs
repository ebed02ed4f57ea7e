//! Validation schemas for product drafts.
//!
//! Two variants share the same field rules:
//!
//! - [`validate_create`] is strict: every field is required and at least
//!   one image must be attached.
//! - [`validate_update`] is relaxed: an empty scalar input means "leave the
//!   stored value alone", and no image is required.
//!
//! Both are pure and report every failing field at once.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use super::draft::ProductDraft;
use super::record::{ProductInput, ProductPatch, ReviewStats};
use crate::types::{Slug, SlugError};

/// Maximum number of buckets in a rating distribution (one per star).
pub const MAX_RATING_BUCKETS: usize = 5;
const MIN_NAME_LENGTH: usize = 3;
const MAX_PRICE_SCALE: u32 = 2;
/// Prices are stored as `NUMERIC(12, 2)`.
const PRICE_LIMIT: i64 = 10_000_000_000;

/// A product field that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    Slug,
    Category,
    Brand,
    Description,
    Price,
    ListPrice,
    CountInStock,
    Images,
    NumReviews,
    AvgRating,
    NumSales,
    RatingDistribution,
}

impl ProductField {
    /// Form field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Slug => "slug",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Description => "description",
            Self::Price => "price",
            Self::ListPrice => "list_price",
            Self::CountInStock => "count_in_stock",
            Self::Images => "images",
            Self::NumReviews => "num_reviews",
            Self::AvgRating => "avg_rating",
            Self::NumSales => "num_sales",
            Self::RatingDistribution => "rating_distribution",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation messages.
///
/// Only the first message for a field is kept, matching what the form
/// shows under each input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<ProductField, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field unless it already has one.
    pub fn add(&mut self, field: ProductField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields and their messages, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Validate a draft for creation.
///
/// # Errors
///
/// Returns [`FieldErrors`] listing every field that failed.
pub fn validate_create(draft: &ProductDraft) -> Result<ProductInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = check(&mut errors, ProductField::Name, parse_name(&draft.name));
    let slug = check(&mut errors, ProductField::Slug, parse_slug(&draft.slug));
    let category = check(
        &mut errors,
        ProductField::Category,
        required(&draft.category, "Category is required"),
    );
    let brand = check(
        &mut errors,
        ProductField::Brand,
        required(&draft.brand, "Brand is required"),
    );
    let description = check(
        &mut errors,
        ProductField::Description,
        required(&draft.description, "Description is required"),
    );
    let price = check(
        &mut errors,
        ProductField::Price,
        parse_price(&draft.price, "Price"),
    );
    let list_price = check(
        &mut errors,
        ProductField::ListPrice,
        parse_price(&draft.list_price, "List price"),
    );
    let count_in_stock = check(
        &mut errors,
        ProductField::CountInStock,
        parse_count(&draft.count_in_stock, "Count in stock"),
    );
    if draft.images.is_empty() {
        errors.add(ProductField::Images, "Product must have at least one image");
    }
    check_reviews(&mut errors, &draft.reviews);

    match (
        name,
        slug,
        category,
        brand,
        description,
        price,
        list_price,
        count_in_stock,
    ) {
        (
            Some(name),
            Some(slug),
            Some(category),
            Some(brand),
            Some(description),
            Some(price),
            Some(list_price),
            Some(count_in_stock),
        ) if errors.is_empty() => Ok(ProductInput {
            name,
            slug,
            category,
            brand,
            description,
            price,
            list_price,
            count_in_stock,
            is_published: draft.is_published,
            images: draft.images.clone(),
            sizes: draft.sizes.clone(),
            colors: draft.colors.clone(),
            tags: draft.tags.clone(),
            reviews: draft.reviews.clone(),
        }),
        _ => Err(errors),
    }
}

/// Validate a draft as a partial update.
///
/// # Errors
///
/// Returns [`FieldErrors`] for every non-empty field whose value is invalid.
pub fn validate_update(draft: &ProductDraft) -> Result<ProductPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = optional(&mut errors, ProductField::Name, &draft.name, parse_name);
    let slug = optional(&mut errors, ProductField::Slug, &draft.slug, parse_slug);
    let category = optional(&mut errors, ProductField::Category, &draft.category, |s| {
        required(s, "Category is required")
    });
    let brand = optional(&mut errors, ProductField::Brand, &draft.brand, |s| {
        required(s, "Brand is required")
    });
    let description = optional(
        &mut errors,
        ProductField::Description,
        &draft.description,
        |s| required(s, "Description is required"),
    );
    let price = optional(&mut errors, ProductField::Price, &draft.price, |s| {
        parse_price(s, "Price")
    });
    let list_price = optional(&mut errors, ProductField::ListPrice, &draft.list_price, |s| {
        parse_price(s, "List price")
    });
    let count_in_stock = optional(
        &mut errors,
        ProductField::CountInStock,
        &draft.count_in_stock,
        |s| parse_count(s, "Count in stock"),
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProductPatch {
        name,
        slug,
        category,
        brand,
        description,
        price,
        list_price,
        count_in_stock,
        is_published: draft.is_published,
        images: draft.images.clone(),
        sizes: draft.sizes.clone(),
        colors: draft.colors.clone(),
        tags: draft.tags.clone(),
    })
}

// =============================================================================
// Field Rules
// =============================================================================

fn check<T>(errors: &mut FieldErrors, field: ProductField, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.add(field, message)).ok()
}

fn optional<T>(
    errors: &mut FieldErrors,
    field: ProductField,
    raw: &str,
    rule: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    if raw.trim().is_empty() {
        return None;
    }
    check(errors, field, rule(raw))
}

fn required(raw: &str, message: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        Err(message.to_string())
    } else {
        Ok(value.to_string())
    }
}

fn parse_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LENGTH {
        return Err(format!("Name must be at least {MIN_NAME_LENGTH} characters"));
    }
    Ok(name.to_string())
}

fn parse_slug(raw: &str) -> Result<Slug, String> {
    Slug::parse(raw.trim()).map_err(|e| match e {
        SlugError::TooShort { min } => format!("Slug must be at least {min} characters"),
        SlugError::TooLong { max } => format!("Slug must be at most {max} characters"),
        SlugError::InvalidCharacter(_) => {
            "Slug may only contain lowercase letters, numbers, hyphens and underscores"
                .to_string()
        }
    })
}

fn parse_price(raw: &str, label: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("{label} is required"));
    }
    let mut price = Decimal::from_str(raw).map_err(|_| format!("{label} must be a number"))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(format!("{label} must be a non-negative number"));
    }
    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(format!(
            "{label} must have exactly two decimal places (e.g., 49.99)"
        ));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(format!("{label} must be less than 10,000,000,000"));
    }
    price.rescale(MAX_PRICE_SCALE);
    Ok(price)
}

fn parse_count(raw: &str, label: &str) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!("{label} is required"));
    }
    let count = raw
        .parse::<i32>()
        .map_err(|_| format!("{label} must be a whole number"))?;
    if count < 0 {
        return Err(format!("{label} must be a non-negative number"));
    }
    Ok(count)
}

fn check_reviews(errors: &mut FieldErrors, reviews: &ReviewStats) {
    if reviews.num_reviews < 0 {
        errors.add(
            ProductField::NumReviews,
            "Number of reviews must be a non-negative number",
        );
    }
    if reviews.num_sales < 0 {
        errors.add(
            ProductField::NumSales,
            "Number of sales must be a non-negative number",
        );
    }
    if reviews.avg_rating < Decimal::ZERO || reviews.avg_rating > Decimal::from(5) {
        errors.add(
            ProductField::AvgRating,
            "Average rating must be between 0 and 5",
        );
    }
    if reviews.rating_distribution.len() > MAX_RATING_BUCKETS {
        errors.add(
            ProductField::RatingDistribution,
            format!("Rating distribution can have at most {MAX_RATING_BUCKETS} entries"),
        );
    }
    if reviews
        .rating_distribution
        .iter()
        .any(|bucket| !(1..=5).contains(&bucket.rating) || bucket.count < 0)
    {
        errors.add(
            ProductField::RatingDistribution,
            "Each rating must be between 1 and 5 with a non-negative count",
        );
    }
}
