//! Product records, the editable draft and its validation schemas.
//!
//! The flow is `ProductDraft` (raw form state) → [`schema`] → either a
//! [`ProductInput`] for creation, a [`ProductPatch`] for updates, or
//! [`FieldErrors`] describing what to fix.

pub mod action;
pub mod draft;
pub mod record;
pub mod schema;

pub use action::ActionResponse;
pub use draft::{ListField, ProductDraft, SAMPLE_DESCRIPTION};
pub use record::{Product, ProductInput, ProductPatch, ProductUpdate, RatingBucket, ReviewStats};
pub use schema::{
    FieldErrors, MAX_RATING_BUCKETS, ProductField, validate_create, validate_update,
};
