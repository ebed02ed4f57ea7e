//! Core types for Shopdesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod role;
pub mod slug;

pub use id::*;
pub use role::UserRole;
pub use slug::{Slug, SlugError, to_slug};
