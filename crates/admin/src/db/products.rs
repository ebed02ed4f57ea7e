//! Product repository for database operations.
//!
//! Queries are checked at runtime (`query_as::<_, Row>`) so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use shopdesk_core::{Product, ProductId, ProductInput, ProductUpdate, RatingBucket, ReviewStats, Slug};

use super::RepositoryError;

/// Products shown per listing page.
pub const PAGE_SIZE: i64 = 10;

/// Latest products shown on the overview page.
const LATEST_LIMIT: i64 = 5;

const PRODUCT_COLUMNS: &str = r"
    id, name, slug, category, brand, description,
    price, list_price, count_in_stock, is_published,
    images, sizes, colors, tags,
    num_reviews, avg_rating, num_sales, rating_distribution,
    created_at, updated_at
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    category: String,
    brand: String,
    description: String,
    price: Decimal,
    list_price: Decimal,
    count_in_stock: i32,
    is_published: bool,
    images: Vec<String>,
    sizes: Vec<String>,
    colors: Vec<String>,
    tags: Vec<String>,
    num_reviews: i32,
    avg_rating: Decimal,
    num_sales: i32,
    rating_distribution: Json<Vec<RatingBucket>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            details: ProductInput {
                name: row.name,
                slug,
                category: row.category,
                brand: row.brand,
                description: row.description,
                price: row.price,
                list_price: row.list_price,
                count_in_stock: row.count_in_stock,
                is_published: row.is_published,
                images: row.images,
                sizes: row.sizes,
                colors: row.colors,
                tags: row.tags,
                reviews: ReviewStats {
                    num_reviews: row.num_reviews,
                    avg_rating: row.avg_rating,
                    num_sales: row.num_sales,
                    rating_distribution: row.rating_distribution.0,
                },
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total: i64,
    published: i64,
    out_of_stock: i64,
}

// =============================================================================
// Query Results
// =============================================================================

/// One page of the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// 1-based page number actually returned.
    pub page: u32,
    pub total_pages: u32,
    /// Products matching the search, across all pages.
    pub total: i64,
}

/// Catalog counts for the overview page.
#[derive(Debug, Clone, Default)]
pub struct ProductStats {
    pub total: i64,
    pub published: i64,
    pub out_of_stock: i64,
    /// Most recently created products, newest first.
    pub latest: Vec<Product>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM admin.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List products whose name matches `query`, newest first.
    ///
    /// Page numbers below 1 are treated as 1.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, query: Option<&str>, page: u32) -> Result<ProductPage, RepositoryError> {
        let pattern = search_pattern(query);
        let page = page.max(1);
        let offset = i64::from(page - 1) * PAGE_SIZE;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM admin.product WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM admin.product
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(pattern.as_deref())
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(ProductPage {
            products,
            page,
            total_pages: total_pages(total),
            total,
        })
    }

    /// Catalog counts plus the latest products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn stats(&self) -> Result<ProductStats, RepositoryError> {
        let counts = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_published) AS published,
                   COUNT(*) FILTER (WHERE count_in_stock = 0) AS out_of_stock
            FROM admin.product
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM admin.product ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(LATEST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(ProductStats {
            total: counts.total,
            published: counts.published,
            out_of_stock: counts.out_of_stock,
            latest: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO admin.product (
                name, slug, category, brand, description,
                price, list_price, count_in_stock, is_published,
                images, sizes, colors, tags,
                num_reviews, avg_rating, num_sales, rating_distribution
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.category)
        .bind(&input.brand)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.list_price)
        .bind(input.count_in_stock)
        .bind(input.is_published)
        .bind(&input.images)
        .bind(&input.sizes)
        .bind(&input.colors)
        .bind(&input.tags)
        .bind(input.reviews.num_reviews)
        .bind(input.reviews.avg_rating)
        .bind(input.reviews.num_sales)
        .bind(Json(&input.reviews.rating_distribution))
        .fetch_one(self.pool)
        .await
        .map_err(map_slug_conflict)?;

        row.try_into()
    }

    /// Apply a partial update.
    ///
    /// `None` scalars keep the stored value; lists and the published flag
    /// are replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the ID.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, update: &ProductUpdate) -> Result<Product, RepositoryError> {
        let changes = &update.changes;
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE admin.product SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                category = COALESCE($4, category),
                brand = COALESCE($5, brand),
                description = COALESCE($6, description),
                price = COALESCE($7, price),
                list_price = COALESCE($8, list_price),
                count_in_stock = COALESCE($9, count_in_stock),
                is_published = $10,
                images = $11,
                sizes = $12,
                colors = $13,
                tags = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(update.id)
        .bind(changes.name.as_deref())
        .bind(changes.slug.as_ref().map(Slug::as_str))
        .bind(changes.category.as_deref())
        .bind(changes.brand.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.list_price)
        .bind(changes.count_in_stock)
        .bind(changes.is_published)
        .bind(&changes.images)
        .bind(&changes.sizes)
        .bind(&changes.colors)
        .bind(&changes.tags)
        .fetch_optional(self.pool)
        .await
        .map_err(map_slug_conflict)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has the ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn map_slug_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("slug already exists".to_owned());
    }
    RepositoryError::Database(e)
}

/// `ILIKE` pattern for a trimmed, non-empty search term.
fn search_pattern(query: Option<&str>) -> Option<String> {
    let term = query.map(str::trim).filter(|q| !q.is_empty())?;
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

fn total_pages(total: i64) -> u32 {
    let pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}
