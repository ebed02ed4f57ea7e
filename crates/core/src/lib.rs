//! Shopdesk Core - Shared types library.
//!
//! This crate provides the types shared by the Shopdesk components:
//! - `admin` - The product admin console
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Validation of a product draft lives here so the
//! same rules apply wherever a product is built.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, user roles and URL slugs
//! - [`product`] - Product records, the editable draft and its validation schemas

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod product;
pub mod types;

pub use product::*;
pub use types::*;
