//! Sign-out.
//!
//! Sign-in is owned by the session provider; the console only ends the
//! session it was handed.

use axum::{
    Router,
    response::{IntoResponse, Redirect},
    routing::post,
};
use tower_sessions::Session;

use crate::error::clear_sentry_user;
use crate::middleware::clear_current_user;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "failed to clear session user");
    }
    clear_sentry_user();

    Redirect::to("/")
}
