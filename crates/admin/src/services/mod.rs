//! Collaborators behind the admin pages.
//!
//! # Services
//!
//! - `products` - Product server actions (create, update, delete, reads)
//! - `uploads` - Product image storage
//! - `notifications` - Toasts carried across redirects in the session

pub mod notifications;
pub mod products;
pub mod uploads;

pub use notifications::{Toast, ToastVariant};
pub use products::{DynProductActions, PgProductActions, ProductActions};
pub use uploads::{
    DynImageStore, ImageStore, ImageUpload, LocalImageStore, UploadError, UploadedImage,
};
