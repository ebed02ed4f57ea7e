//! HTTP middleware and extractors for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Path normalization (trailing slashes)
//! 2. Sentry layers (capture errors, transactions)
//! 3. `TraceLayer` (request tracing)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Body limit sized for image uploads
//! 6. Security headers
//!
//! Role checks happen per handler through the [`RequireAdmin`] extractor.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalUser, RequireAdmin, clear_current_user, set_current_user};
pub use security_headers::security_headers;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store};
