//! The product form: posted fields, intents and the state controller.

pub mod fields;
pub mod intent;
pub mod product_form;

pub use fields::{FormError, FormFields};
pub use intent::{FormIntent, IntentError};
pub use product_form::{FormMode, FormState, PendingEntries, ProductForm, SubmitOutcome};
