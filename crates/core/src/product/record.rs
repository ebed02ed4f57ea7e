//! Validated product records.
//!
//! These are only constructed by the validation schemas (or read back from
//! storage), so holders can assume every invariant already holds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Slug};

/// Number of reviews left with a given star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBucket {
    /// Star rating, 1 to 5.
    pub rating: i32,
    /// Reviews with that rating.
    pub count: i32,
}

/// Review aggregates kept on the product row.
///
/// Maintained by the review system; the product form carries them through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub num_reviews: i32,
    pub avg_rating: Decimal,
    pub num_sales: i32,
    pub rating_distribution: Vec<RatingBucket>,
}

/// A complete, validated product ready to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: Slug,
    pub category: String,
    pub brand: String,
    pub description: String,
    /// Net price, two decimal places.
    pub price: Decimal,
    /// Strike-through list price, two decimal places.
    pub list_price: Decimal,
    pub count_in_stock: i32,
    pub is_published: bool,
    /// Image URLs in display order.
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub reviews: ReviewStats,
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial changes to an existing product.
///
/// `None` leaves the stored value unchanged. Lists and the published flag
/// are always sent by the form, so they always replace the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub count_in_stock: Option<i32>,
    pub is_published: bool,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
}

/// A patch addressed to a specific product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub id: ProductId,
    #[serde(flatten)]
    pub changes: ProductPatch,
}
