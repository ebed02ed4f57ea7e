//! Overview (dashboard) page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
};
use tracing::instrument;

use super::UserView;
use super::products::ProductRowView;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Catalog counts for the overview cards.
#[derive(Debug, Clone, Default)]
pub struct OverviewMetrics {
    pub total: i64,
    pub published: i64,
    pub drafts: i64,
    pub out_of_stock: i64,
}

/// Overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "overview.html")]
pub struct OverviewTemplate {
    pub user: UserView,
    pub current_path: String,
    pub metrics: OverviewMetrics,
    pub latest: Vec<ProductRowView>,
}

/// Build the overview router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_root))
        .route("/admin/overview", get(overview))
}

/// GET /admin
async fn admin_root(RequireAdmin(_user): RequireAdmin) -> Redirect {
    Redirect::to("/admin/overview")
}

/// GET /admin/overview
#[instrument(skip(user, state), fields(user_id = %user.id))]
async fn overview(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.products().product_stats().await?;

    Ok(OverviewTemplate {
        user: UserView::from(&user),
        current_path: "/admin/overview".to_string(),
        metrics: OverviewMetrics {
            total: stats.total,
            published: stats.published,
            drafts: stats.total - stats.published,
            out_of_stock: stats.out_of_stock,
        },
        latest: stats.latest.iter().map(ProductRowView::from).collect(),
    })
}
