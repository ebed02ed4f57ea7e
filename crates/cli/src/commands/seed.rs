//! Seed the catalog with sample products.
//!
//! Samples go through the same validation as the admin form, so a seeded
//! product can always be opened and saved again.

use shopdesk_admin::db::{ProductRepository, RepositoryError, create_pool};
use shopdesk_core::{ProductDraft, ProductInput, validate_create};

use super::{CommandError, database_url};

struct Sample {
    name: &'static str,
    category: &'static str,
    brand: &'static str,
    description: &'static str,
    price: &'static str,
    list_price: &'static str,
    count_in_stock: &'static str,
    image: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    tags: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        name: "Classic Cotton Tee",
        category: "T-Shirts",
        brand: "Northline",
        description: "Soft, breathable everyday t-shirt in heavyweight cotton.",
        price: "19.99",
        list_price: "24.99",
        count_in_stock: "120",
        image: "/static/samples/tee.jpg",
        sizes: &["S", "M", "L", "XL"],
        colors: &["White", "Black", "Navy"],
        tags: &["new-arrival", "best-seller"],
    },
    Sample {
        name: "Slim Fit Oxford Shirt",
        category: "Shirts",
        brand: "Northline",
        description: "Button-down oxford with a tailored fit.",
        price: "49.00",
        list_price: "59.00",
        count_in_stock: "40",
        image: "/static/samples/oxford.jpg",
        sizes: &["M", "L"],
        colors: &["Blue", "White"],
        tags: &["featured"],
    },
    Sample {
        name: "Trail Runner Sneaker",
        category: "Shoes",
        brand: "Stride",
        description: "Lightweight trail shoe with a grippy outsole.",
        price: "89.99",
        list_price: "99.99",
        count_in_stock: "0",
        image: "/static/samples/sneaker.jpg",
        sizes: &["40", "41", "42", "43", "44"],
        colors: &["Grey"],
        tags: &["outdoor"],
    },
    Sample {
        name: "Wool Beanie",
        category: "Accessories",
        brand: "Fjell",
        description: "Ribbed merino beanie for cold mornings.",
        price: "15.50",
        list_price: "15.50",
        count_in_stock: "75",
        image: "/static/samples/beanie.jpg",
        sizes: &[],
        colors: &["Red", "Charcoal"],
        tags: &["winter"],
    },
];

/// Insert the sample products.
///
/// Returns how many were inserted; samples whose slug already exists are
/// skipped.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a sample is invalid.
pub async fn products(clear: bool) -> Result<usize, CommandError> {
    let inputs = sample_inputs()?;

    let pool = create_pool(&database_url()?).await?;
    if clear {
        let deleted = sqlx::query("DELETE FROM admin.product")
            .execute(&pool)
            .await?
            .rows_affected();
        tracing::info!("Deleted {deleted} existing product(s)");
    }

    let repo = ProductRepository::new(&pool);
    let mut inserted = 0;
    for input in &inputs {
        match repo.create(input).await {
            Ok(product) => {
                tracing::info!(product_id = %product.id, slug = %input.slug, "inserted");
                inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(slug = %input.slug, "already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(inserted)
}

/// Validated inputs for every sample.
fn sample_inputs() -> Result<Vec<ProductInput>, CommandError> {
    SAMPLES.iter().map(sample_input).collect()
}

fn sample_input(sample: &Sample) -> Result<ProductInput, CommandError> {
    let mut draft = ProductDraft {
        name: sample.name.to_string(),
        category: sample.category.to_string(),
        brand: sample.brand.to_string(),
        description: sample.description.to_string(),
        price: sample.price.to_string(),
        list_price: sample.list_price.to_string(),
        count_in_stock: sample.count_in_stock.to_string(),
        is_published: true,
        ..ProductDraft::blank()
    };
    draft.generate_slug();
    draft.add_image(sample.image);
    for size in sample.sizes {
        draft.add_entry(shopdesk_core::ListField::Sizes, size);
    }
    for color in sample.colors {
        draft.add_entry(shopdesk_core::ListField::Colors, color);
    }
    for tag in sample.tags {
        draft.add_entry(shopdesk_core::ListField::Tags, tag);
    }

    validate_create(&draft).map_err(|errors| CommandError::InvalidSample {
        slug: draft.slug.clone(),
        reason: errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; "),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sample_is_valid() {
        let inputs = sample_inputs().unwrap();
        assert_eq!(inputs.len(), SAMPLES.len());
        assert_eq!(inputs[0].slug.as_str(), "classic-cotton-tee");
    }

    #[test]
    fn test_sample_slugs_are_unique() {
        let inputs = sample_inputs().unwrap();
        let mut slugs: Vec<_> = inputs.iter().map(|i| i.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), inputs.len());
    }
}
