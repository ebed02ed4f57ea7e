//! Form state controller for the product create/edit page.
//!
//! A controller lives for one request: the handler rebuilds it from the
//! posted fields, applies the intent, then renders it or follows the
//! navigation it returns.

use shopdesk_core::{
    FieldErrors, ListField, Product, ProductDraft, ProductId, ProductUpdate, validate_create,
    validate_update,
};

use crate::services::notifications::Toast;
use crate::services::products::ProductActions;
use crate::services::uploads::UploadedImage;

/// Listing page the form returns to.
pub const PRODUCTS_PATH: &str = "/admin/products";

/// Whether the form creates a product or edits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// The identity key may be missing when the page was opened without one.
    Update { product_id: Option<ProductId> },
}

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Editing,
    Validating,
    Submitting,
    Succeeded,
}

/// Result of [`ProductForm::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; errors are on the form, no action was called.
    Invalid,
    /// The action refused; its message is the form's toast.
    Rejected,
    /// Leave the form, optionally flashing a toast on the next page.
    Navigate { to: &'static str, flash: Option<Toast> },
}

/// Text typed into the size, color and tag boxes but not yet added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEntries {
    pub size: String,
    pub color: String,
    pub tag: String,
}

impl PendingEntries {
    /// Form field name of a pending box.
    #[must_use]
    pub const fn field_name(field: ListField) -> &'static str {
        match field {
            ListField::Sizes => "pending_size",
            ListField::Colors => "pending_color",
            ListField::Tags => "pending_tag",
        }
    }

    #[must_use]
    pub fn get(&self, field: ListField) -> &str {
        match field {
            ListField::Sizes => &self.size,
            ListField::Colors => &self.color,
            ListField::Tags => &self.tag,
        }
    }

    fn get_mut(&mut self, field: ListField) -> &mut String {
        match field {
            ListField::Sizes => &mut self.size,
            ListField::Colors => &mut self.color,
            ListField::Tags => &mut self.tag,
        }
    }
}

/// The product form: one draft, its pending entries and what to show.
#[derive(Debug, Clone)]
pub struct ProductForm {
    mode: FormMode,
    draft: ProductDraft,
    pending: PendingEntries,
    errors: FieldErrors,
    toast: Option<Toast>,
    state: FormState,
}

impl ProductForm {
    /// Fresh form for first render.
    ///
    /// Create mode starts from sample values when `sample_defaults` is set
    /// and from a blank draft otherwise. Update mode copies `existing`.
    #[must_use]
    pub fn initialize(mode: FormMode, existing: Option<&Product>, sample_defaults: bool) -> Self {
        let draft = match (mode, existing) {
            (FormMode::Update { .. }, Some(product)) => ProductDraft::from(product),
            (FormMode::Create, _) if sample_defaults => ProductDraft::sample(),
            _ => ProductDraft::blank(),
        };
        Self::from_parts(mode, draft, PendingEntries::default())
    }

    /// Form rebuilt from posted fields.
    #[must_use]
    pub fn from_parts(mode: FormMode, draft: ProductDraft, pending: PendingEntries) -> Self {
        Self {
            mode,
            draft,
            pending,
            errors: FieldErrors::new(),
            toast: None,
            state: FormState::Editing,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub const fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    #[must_use]
    pub const fn pending(&self) -> &PendingEntries {
        &self.pending
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub const fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    pub fn set_pending(&mut self, field: ListField, value: impl Into<String>) {
        *self.pending.get_mut(field) = value.into();
    }

    /// Add the pending entry of one list field.
    ///
    /// The pending box is cleared only when the entry was appended, so a
    /// rejected duplicate stays visible.
    pub fn commit_pending(&mut self, field: ListField) -> bool {
        let added = self.draft.add_entry(field, self.pending.get(field));
        if added {
            self.pending.get_mut(field).clear();
        }
        added
    }

    /// Enter-key default action: add every non-empty pending entry.
    pub fn commit_all_pending(&mut self) {
        for field in ListField::ALL {
            if !self.pending.get(field).trim().is_empty() {
                self.commit_pending(field);
            }
        }
    }

    pub fn remove_entry(&mut self, field: ListField, value: &str) {
        self.draft.remove_entry(field, value);
    }

    pub fn generate_slug(&mut self) {
        self.draft.generate_slug();
    }

    /// Append the first stored image.
    pub fn upload_completed(&mut self, images: &[UploadedImage]) {
        if let Some(image) = images.first() {
            self.draft.add_image(&image.url);
        }
    }

    /// Report a failed upload; the image list is left alone.
    pub fn upload_failed(&mut self, message: &str) {
        self.toast = Some(Toast::destructive(format!("ERROR! {message}")));
    }

    pub fn remove_image(&mut self, url: &str) {
        self.draft.remove_image(url);
    }

    /// Validate the draft and hand it to the matching server action.
    ///
    /// Taking `&mut self` means a form can have only one submission in
    /// flight.
    pub async fn submit(&mut self, actions: &dyn ProductActions) -> SubmitOutcome {
        self.state = FormState::Validating;
        self.errors = FieldErrors::new();
        self.toast = None;

        match self.mode {
            FormMode::Create => {
                let input = match validate_create(&self.draft) {
                    Ok(input) => input,
                    Err(errors) => return self.invalid(errors),
                };
                self.state = FormState::Submitting;
                let response = actions.create_product(input).await;
                if response.success {
                    self.succeed(Some(Toast::info(response.message)))
                } else {
                    self.reject(response.message)
                }
            }
            FormMode::Update { product_id } => {
                let changes = match validate_update(&self.draft) {
                    Ok(changes) => changes,
                    Err(errors) => return self.invalid(errors),
                };
                let Some(id) = product_id else {
                    tracing::warn!("update submitted without a product id");
                    return self.succeed(None);
                };
                self.state = FormState::Submitting;
                let response = actions.update_product(ProductUpdate { id, changes }).await;
                if response.success {
                    self.succeed(None)
                } else {
                    self.reject(response.message)
                }
            }
        }
    }

    fn invalid(&mut self, errors: FieldErrors) -> SubmitOutcome {
        tracing::debug!(fields = errors.len(), "product draft failed validation");
        self.errors = errors;
        self.state = FormState::Editing;
        SubmitOutcome::Invalid
    }

    fn reject(&mut self, message: String) -> SubmitOutcome {
        self.toast = Some(Toast::destructive(message));
        self.state = FormState::Editing;
        SubmitOutcome::Rejected
    }

    fn succeed(&mut self, flash: Option<Toast>) -> SubmitOutcome {
        self.state = FormState::Succeeded;
        SubmitOutcome::Navigate {
            to: PRODUCTS_PATH,
            flash,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shopdesk_core::{ActionResponse, ProductInput, SAMPLE_DESCRIPTION};

    use super::*;
    use crate::db::{ProductPage, ProductStats, RepositoryError};

    /// Records every write and answers with a fixed response.
    struct RecordingActions {
        response: ActionResponse,
        creates: Mutex<Vec<ProductInput>>,
        updates: Mutex<Vec<ProductUpdate>>,
    }

    impl RecordingActions {
        fn answering(response: ActionResponse) -> Self {
            Self {
                response,
                creates: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
            }
        }

        fn create_calls(&self) -> usize {
            self.creates.lock().unwrap().len()
        }

        fn update_calls(&self) -> usize {
            self.updates.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProductActions for RecordingActions {
        async fn create_product(&self, input: ProductInput) -> ActionResponse {
            self.creates.lock().unwrap().push(input);
            self.response.clone()
        }

        async fn update_product(&self, update: ProductUpdate) -> ActionResponse {
            self.updates.lock().unwrap().push(update);
            self.response.clone()
        }

        async fn delete_product(&self, _id: ProductId) -> ActionResponse {
            self.response.clone()
        }

        async fn get_product(&self, _id: ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(None)
        }

        async fn list_products(
            &self,
            _query: Option<&str>,
            _page: u32,
        ) -> Result<ProductPage, RepositoryError> {
            Ok(ProductPage::default())
        }

        async fn product_stats(&self) -> Result<ProductStats, RepositoryError> {
            Ok(ProductStats::default())
        }
    }

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            name: "Red Running Shoe".to_string(),
            slug: "red-running-shoe".to_string(),
            category: "Shoes".to_string(),
            brand: "Stride".to_string(),
            description: "Lightweight trainer.".to_string(),
            price: "49.99".to_string(),
            list_price: "59.99".to_string(),
            count_in_stock: "3".to_string(),
            images: vec!["/uploads/shoe.png".to_string()],
            ..ProductDraft::blank()
        }
    }

    fn create_form(draft: ProductDraft) -> ProductForm {
        ProductForm::from_parts(FormMode::Create, draft, PendingEntries::default())
    }

    #[test]
    fn test_initialize_create_with_sample_defaults() {
        let form = ProductForm::initialize(FormMode::Create, None, true);
        assert_eq!(form.draft().description, SAMPLE_DESCRIPTION);
        assert_eq!(form.draft().price, "99.99");
        assert_eq!(form.draft().count_in_stock, "15");
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn test_initialize_create_without_sample_defaults() {
        let form = ProductForm::initialize(FormMode::Create, None, false);
        assert_eq!(form.draft(), &ProductDraft::blank());
    }

    #[test]
    fn test_commit_pending_clears_buffer_only_when_added() {
        let mut form = create_form(valid_draft());
        form.set_pending(ListField::Colors, " Red ");
        assert!(form.commit_pending(ListField::Colors));
        assert_eq!(form.pending().get(ListField::Colors), "");
        assert_eq!(form.draft().colors, vec!["Red"]);

        form.set_pending(ListField::Colors, "Red");
        assert!(!form.commit_pending(ListField::Colors));
        assert_eq!(form.pending().get(ListField::Colors), "Red");
        assert_eq!(form.draft().colors.len(), 1);
    }

    #[test]
    fn test_commit_all_pending_skips_empty_buffers() {
        let mut form = create_form(valid_draft());
        form.set_pending(ListField::Sizes, "XL");
        form.set_pending(ListField::Tags, "New");
        form.commit_all_pending();
        assert_eq!(form.draft().sizes, vec!["XL"]);
        assert!(form.draft().colors.is_empty());
        assert_eq!(form.draft().tags, vec!["New"]);
    }

    #[test]
    fn test_upload_completed_appends_first_url() {
        let mut form = create_form(ProductDraft::blank());
        form.upload_completed(&[
            UploadedImage {
                url: "/uploads/a.png".to_string(),
            },
            UploadedImage {
                url: "/uploads/b.png".to_string(),
            },
        ]);
        assert_eq!(form.draft().images, vec!["/uploads/a.png"]);
    }

    #[test]
    fn test_upload_failed_shows_toast_and_keeps_images() {
        let mut form = create_form(valid_draft());
        form.upload_failed("File is too large");
        let toast = form.toast().unwrap();
        assert!(toast.is_destructive());
        assert_eq!(toast.description, "ERROR! File is too large");
        assert_eq!(form.draft().images, vec!["/uploads/shoe.png"]);
    }

    #[tokio::test]
    async fn test_create_with_empty_name_never_calls_action() {
        let actions = RecordingActions::answering(ActionResponse::ok("Product created successfully"));
        let mut form = create_form(ProductDraft {
            name: String::new(),
            ..valid_draft()
        });

        let outcome = form.submit(&actions).await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(actions.create_calls(), 0);
        assert!(form.errors().get(shopdesk_core::ProductField::Name).is_some());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_create_success_navigates_with_flash() {
        let actions = RecordingActions::answering(ActionResponse::ok("Product created successfully"));
        let mut form = create_form(valid_draft());

        let outcome = form.submit(&actions).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Navigate {
                to: "/admin/products",
                flash: Some(Toast::info("Product created successfully")),
            }
        );
        assert_eq!(actions.create_calls(), 1);
        assert_eq!(form.state(), FormState::Succeeded);
    }

    #[tokio::test]
    async fn test_create_rejected_keeps_draft_and_shows_message() {
        let actions = RecordingActions::answering(ActionResponse::fail("Slug already exists"));
        let mut form = create_form(valid_draft());

        let outcome = form.submit(&actions).await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(form.toast(), Some(&Toast::destructive("Slug already exists")));
        assert_eq!(form.draft(), &valid_draft());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[tokio::test]
    async fn test_update_without_id_navigates_without_calling_action() {
        let actions = RecordingActions::answering(ActionResponse::ok("Product updated successfully"));
        let mut form = ProductForm::from_parts(
            FormMode::Update { product_id: None },
            valid_draft(),
            PendingEntries::default(),
        );

        let outcome = form.submit(&actions).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Navigate {
                to: "/admin/products",
                flash: None,
            }
        );
        assert_eq!(actions.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_sends_patch_with_id() {
        let actions = RecordingActions::answering(ActionResponse::ok("Product updated successfully"));
        let mut form = ProductForm::from_parts(
            FormMode::Update {
                product_id: Some(ProductId::new(9)),
            },
            ProductDraft {
                images: vec![],
                ..valid_draft()
            },
            PendingEntries::default(),
        );

        let outcome = form.submit(&actions).await;

        assert!(matches!(outcome, SubmitOutcome::Navigate { flash: None, .. }));
        let updates = actions.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, ProductId::new(9));
        assert_eq!(updates[0].changes.name.as_deref(), Some("Red Running Shoe"));
    }

    #[tokio::test]
    async fn test_resubmit_clears_previous_errors() {
        let actions = RecordingActions::answering(ActionResponse::ok("Product created successfully"));
        let mut form = create_form(ProductDraft {
            slug: "x".to_string(),
            ..valid_draft()
        });
        assert_eq!(form.submit(&actions).await, SubmitOutcome::Invalid);

        form.generate_slug();
        assert!(matches!(
            form.submit(&actions).await,
            SubmitOutcome::Navigate { .. }
        ));
        assert!(form.errors().is_empty());
    }
}
