//! The editable, not-yet-validated product record behind the admin form.

use serde::{Deserialize, Serialize};

use super::record::{Product, ReviewStats};
use crate::types::to_slug;

/// Description seeded into new drafts when sample defaults are enabled.
pub const SAMPLE_DESCRIPTION: &str = "This is a sample description of the product.";

/// A multi-value product field edited through a pending-entry box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField {
    Sizes,
    Colors,
    Tags,
}

impl ListField {
    /// All list fields, in form order.
    pub const ALL: [Self; 3] = [Self::Sizes, Self::Colors, Self::Tags];

    /// Form field name of the committed list.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sizes => "sizes",
            Self::Colors => "colors",
            Self::Tags => "tags",
        }
    }
}

impl std::fmt::Display for ListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sizes" => Ok(Self::Sizes),
            "colors" => Ok(Self::Colors),
            "tags" => Ok(Self::Tags),
            _ => Err(format!("unknown list field: {s}")),
        }
    }
}

/// In-memory product record bound to the admin form.
///
/// Text and numeric inputs stay as the raw strings the user typed so that
/// an invalid value can be shown back next to its error. Lists are kept
/// free of duplicates by [`add_entry`](Self::add_entry) and
/// [`add_image`](Self::add_image); validation does not re-check them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub price: String,
    pub list_price: String,
    pub count_in_stock: String,
    pub is_published: bool,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub reviews: ReviewStats,
}

impl ProductDraft {
    /// Empty draft with zeroed numeric inputs.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            price: "0".to_string(),
            list_price: "0".to_string(),
            count_in_stock: "0".to_string(),
            ..Self::default()
        }
    }

    /// Draft pre-filled with illustrative values for local development.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            description: SAMPLE_DESCRIPTION.to_string(),
            price: "99.99".to_string(),
            count_in_stock: "15".to_string(),
            ..Self::blank()
        }
    }

    /// The committed entries of a list field.
    #[must_use]
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Sizes => &self.sizes,
            ListField::Colors => &self.colors,
            ListField::Tags => &self.tags,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Sizes => &mut self.sizes,
            ListField::Colors => &mut self.colors,
            ListField::Tags => &mut self.tags,
        }
    }

    /// Append a trimmed value to a list field.
    ///
    /// Returns `false` without changing anything when the trimmed value is
    /// empty or already present (exact, case-sensitive match).
    pub fn add_entry(&mut self, field: ListField, value: &str) -> bool {
        push_unique(self.list_mut(field), value)
    }

    /// Remove every occurrence of a value from a list field.
    ///
    /// Returns whether anything was removed.
    pub fn remove_entry(&mut self, field: ListField, value: &str) -> bool {
        remove_value(self.list_mut(field), value)
    }

    /// Append an uploaded image URL, skipping duplicates.
    pub fn add_image(&mut self, url: &str) -> bool {
        push_unique(&mut self.images, url)
    }

    /// Remove an image URL.
    pub fn remove_image(&mut self, url: &str) -> bool {
        remove_value(&mut self.images, url)
    }

    /// Overwrite the slug with one derived from the current name.
    pub fn generate_slug(&mut self) {
        self.slug = to_slug(&self.name);
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        let p = &product.details;
        Self {
            name: p.name.clone(),
            slug: p.slug.to_string(),
            category: p.category.clone(),
            brand: p.brand.clone(),
            description: p.description.clone(),
            price: p.price.to_string(),
            list_price: p.list_price.to_string(),
            count_in_stock: p.count_in_stock.to_string(),
            is_published: p.is_published,
            images: p.images.clone(),
            sizes: p.sizes.clone(),
            colors: p.colors.clone(),
            tags: p.tags.clone(),
            reviews: p.reviews.clone(),
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_value(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != value);
    list.len() != before
}
