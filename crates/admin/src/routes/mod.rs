//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Public home page
//! POST /auth/logout                    - Clear the session user
//!
//! # Admin (role-gated; anyone but an Admin is redirected to /)
//! GET  /admin                          - Redirect to overview
//! GET  /admin/overview                 - Catalog counts and latest products
//! GET  /admin/products                 - Product listing (?query=&page=)
//! GET  /admin/products/create          - New product form
//! POST /admin/products/create          - New product form interaction
//! GET  /admin/products/{id}            - Edit product form
//! POST /admin/products/{id}            - Edit product form interaction
//! POST /admin/products/{id}/delete     - Delete product
//! ```
//!
//! Health checks and static files are mounted in `main.rs`.

pub mod auth;
pub mod home;
pub mod overview;
pub mod products;

use axum::Router;

use crate::models::CurrentUser;
use crate::state::AppState;

/// Build all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(auth::router())
        .merge(overview::router())
        .merge(products::router())
}

/// Signed-in user shown in the admin header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
