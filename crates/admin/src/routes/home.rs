//! Public home page.
//!
//! Also where rejected admin requests land.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, response::IntoResponse, routing::get};

use crate::middleware::OptionalUser;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user_name: Option<String>,
    pub is_admin: bool,
}

/// Build the home router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// GET /
async fn home(OptionalUser(user): OptionalUser) -> impl IntoResponse {
    HomeTemplate {
        is_admin: user.as_ref().is_some_and(|u| u.is_admin()),
        user_name: user.map(|u| u.name),
    }
}
