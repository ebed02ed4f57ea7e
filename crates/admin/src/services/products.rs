//! Product server actions.
//!
//! Writes report an [`ActionResponse`] rather than an error: the form only
//! ever shows the message, so repository failures are logged here and
//! flattened into a failed response.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use shopdesk_core::{ActionResponse, Product, ProductId, ProductInput, ProductUpdate};

use crate::db::{ProductPage, ProductRepository, ProductStats, RepositoryError};

pub const CREATED: &str = "Product created successfully";
pub const UPDATED: &str = "Product updated successfully";
pub const DELETED: &str = "Product deleted successfully";
pub const SLUG_TAKEN: &str = "Slug already exists";
pub const NOT_FOUND: &str = "Product not found";
const FAILED: &str = "Something went wrong. Please try again.";

/// Shared handle to the product actions.
pub type DynProductActions = Arc<dyn ProductActions>;

/// Persistence operations behind the product pages.
#[async_trait]
pub trait ProductActions: Send + Sync {
    /// Persist a new product.
    async fn create_product(&self, input: ProductInput) -> ActionResponse;

    /// Apply a partial update to an existing product.
    async fn update_product(&self, update: ProductUpdate) -> ActionResponse;

    /// Remove a product.
    async fn delete_product(&self, id: ProductId) -> ActionResponse;

    /// Load one product for the edit page.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// One page of the listing, filtered by name.
    async fn list_products(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> Result<ProductPage, RepositoryError>;

    /// Counts and latest products for the overview page.
    async fn product_stats(&self) -> Result<ProductStats, RepositoryError>;
}

/// `PostgreSQL`-backed product actions.
#[derive(Clone)]
pub struct PgProductActions {
    pool: PgPool,
}

impl PgProductActions {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

#[async_trait]
impl ProductActions for PgProductActions {
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    async fn create_product(&self, input: ProductInput) -> ActionResponse {
        match self.repo().create(&input).await {
            Ok(product) => {
                tracing::info!(product_id = %product.id, "product created");
                ActionResponse::ok(CREATED)
            }
            Err(e) => failure(&e),
        }
    }

    #[instrument(skip(self, update), fields(product_id = %update.id))]
    async fn update_product(&self, update: ProductUpdate) -> ActionResponse {
        match self.repo().update(&update).await {
            Ok(_) => {
                tracing::info!("product updated");
                ActionResponse::ok(UPDATED)
            }
            Err(e) => failure(&e),
        }
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> ActionResponse {
        match self.repo().delete(id).await {
            Ok(()) => {
                tracing::info!("product deleted");
                ActionResponse::ok(DELETED)
            }
            Err(e) => failure(&e),
        }
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.repo().get_by_id(id).await
    }

    async fn list_products(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        self.repo().list(query, page).await
    }

    async fn product_stats(&self) -> Result<ProductStats, RepositoryError> {
        self.repo().stats().await
    }
}

/// Message shown to the user for a failed write.
fn failure(error: &RepositoryError) -> ActionResponse {
    match error {
        RepositoryError::Conflict(_) => ActionResponse::fail(SLUG_TAKEN),
        RepositoryError::NotFound => ActionResponse::fail(NOT_FOUND),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            let event_id = sentry::capture_error(error);
            tracing::error!(error = %error, sentry_event_id = %event_id, "product action failed");
            ActionResponse::fail(FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_slug_message() {
        let response = failure(&RepositoryError::Conflict("slug already exists".to_string()));
        assert_eq!(response, ActionResponse::fail("Slug already exists"));
    }

    #[test]
    fn test_not_found_maps_to_message() {
        let response = failure(&RepositoryError::NotFound);
        assert!(!response.success);
        assert_eq!(response.message, "Product not found");
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let response = failure(&RepositoryError::DataCorruption("bad slug 'X'".to_string()));
        assert!(!response.success);
        assert!(!response.message.contains("bad slug"));
    }
}
