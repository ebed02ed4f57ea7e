//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::products::{DynProductActions, PgProductActions, ProductActions};
use crate::services::uploads::{DynImageStore, ImageStore, LocalImageStore};

/// Application state shared across all handlers.
///
/// Cheap to clone: everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    products: DynProductActions,
    images: DynImageStore,
}

impl AppState {
    /// State wired to the `PostgreSQL` actions and the local image store.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let products = Arc::new(PgProductActions::new(pool.clone()));
        let images = Arc::new(LocalImageStore::new(&config.uploads));
        Self::with_services(config, pool, products, images)
    }

    /// State with explicit collaborators.
    #[must_use]
    pub fn with_services(
        config: AdminConfig,
        pool: PgPool,
        products: DynProductActions,
        images: DynImageStore,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                products,
                images,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Product server actions.
    #[must_use]
    pub fn products(&self) -> &dyn ProductActions {
        self.inner.products.as_ref()
    }

    /// Product image storage.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }
}
