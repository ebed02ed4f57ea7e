//! Product listing and the create/edit form.
//!
//! The form is fully server-rendered: every button posts the whole form with
//! an `intent`, the handler rebuilds the [`ProductForm`] from the posted
//! fields, applies the intent and renders the form again. Only a successful
//! submit leaves the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopdesk_core::{ListField, Product, ProductField, ProductId};

use super::UserView;
use crate::error::AppError;
use crate::forms::product_form::PRODUCTS_PATH;
use crate::forms::{FormFields, FormIntent, FormMode, PendingEntries, ProductForm, SubmitOutcome};
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::services::notifications::{Toast, push_flash, take_flash};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(index))
        .route("/admin/products/create", get(new_form).post(create_form_post))
        .route("/admin/products/{id}", get(edit_form).post(update_form_post))
        .route("/admin/products/{id}/delete", post(delete))
}

// =============================================================================
// Views
// =============================================================================

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

/// Product row for the listing and overview tables.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub price: String,
    pub count_in_stock: i32,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub avg_rating: String,
    pub updated_at: String,
}

fn format_price(amount: &Decimal) -> String {
    format!("${amount:.2}")
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        let p = &product.details;
        Self {
            id: product.id.to_string(),
            name: p.name.clone(),
            slug: p.slug.to_string(),
            category: p.category.clone(),
            price: format_price(&p.price),
            count_in_stock: p.count_in_stock,
            is_published: p.is_published,
            image_url: p.images.first().cloned(),
            avg_rating: format!("{:.1}", p.reviews.avg_rating),
            updated_at: product.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: UserView,
    pub current_path: String,
    pub toast: Option<Toast>,
    pub products: Vec<ProductRowView>,
    pub search_query: String,
    pub page: u32,
    pub total_pages: u32,
    pub total: i64,
}

impl ProductsIndexTemplate {
    fn page_link(&self, page: u32) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if !self.search_query.is_empty() {
            query.append_pair("query", &self.search_query);
        }
        query.append_pair("page", &page.to_string());
        format!("{PRODUCTS_PATH}?{}", query.finish())
    }

    pub fn prev_link(&self) -> Option<String> {
        (self.page > 1).then(|| self.page_link(self.page - 1))
    }

    pub fn next_link(&self) -> Option<String> {
        (self.page < self.total_pages).then(|| self.page_link(self.page + 1))
    }
}

/// One committed list field with its pending box.
#[derive(Debug, Clone)]
pub struct ListFieldView {
    pub field: &'static str,
    pub label: &'static str,
    pub pending_name: &'static str,
    pub pending: String,
    pub entries: Vec<String>,
}

/// Everything the form template renders.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub price: String,
    pub list_price: String,
    pub count_in_stock: String,
    pub is_published: bool,
    pub images: Vec<String>,
    pub lists: Vec<ListFieldView>,
    pub num_reviews: i32,
    pub avg_rating: String,
    pub num_sales: i32,
    pub rating_distribution: String,
    pub errors: Vec<(&'static str, String)>,
}

impl FormView {
    /// Error message for a form field, empty when it passed.
    pub fn error(&self, field: &str) -> &str {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map_or("", |(_, message)| message.as_str())
    }

    /// Errors not tied to a visible input.
    pub fn review_errors(&self) -> Vec<&str> {
        [
            ProductField::NumReviews,
            ProductField::AvgRating,
            ProductField::NumSales,
            ProductField::RatingDistribution,
        ]
        .iter()
        .map(|field| self.error(field.as_str()))
        .filter(|message| !message.is_empty())
        .collect()
    }
}

impl From<&ProductForm> for FormView {
    fn from(form: &ProductForm) -> Self {
        let draft = form.draft();
        let lists = ListField::ALL
            .iter()
            .map(|&field| ListFieldView {
                field: field.as_str(),
                label: match field {
                    ListField::Sizes => "Size",
                    ListField::Colors => "Color",
                    ListField::Tags => "Tag",
                },
                pending_name: PendingEntries::field_name(field),
                pending: form.pending().get(field).to_string(),
                entries: draft.list(field).to_vec(),
            })
            .collect();

        Self {
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            category: draft.category.clone(),
            brand: draft.brand.clone(),
            description: draft.description.clone(),
            price: draft.price.clone(),
            list_price: draft.list_price.clone(),
            count_in_stock: draft.count_in_stock.clone(),
            is_published: draft.is_published,
            images: draft.images.clone(),
            lists,
            num_reviews: draft.reviews.num_reviews,
            avg_rating: draft.reviews.avg_rating.to_string(),
            num_sales: draft.reviews.num_sales,
            rating_distribution: serde_json::to_string(&draft.reviews.rating_distribution)
                .unwrap_or_else(|_| "[]".to_string()),
            errors: form
                .errors()
                .iter()
                .map(|(field, message)| (field.as_str(), message.to_string()))
                .collect(),
        }
    }
}

/// Product create/edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub user: UserView,
    pub current_path: String,
    pub title: String,
    pub action: String,
    pub product_id: String,
    pub is_update: bool,
    pub toast: Option<Toast>,
    pub form: FormView,
}

impl ProductFormTemplate {
    fn new(user: &CurrentUser, form: &ProductForm, action: String) -> Self {
        let (title, product_id, is_update) = match form.mode() {
            FormMode::Create => ("Create Product", String::new(), false),
            FormMode::Update { product_id } => (
                "Update Product",
                product_id.map(|id| id.to_string()).unwrap_or_default(),
                true,
            ),
        };

        Self {
            user: UserView::from(user),
            current_path: PRODUCTS_PATH.to_string(),
            title: title.to_string(),
            action,
            product_id,
            is_update,
            toast: form.toast().cloned(),
            form: FormView::from(form),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /admin/products
#[instrument(skip(user, state, session), fields(user_id = %user.id))]
async fn index(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let search = query.query.unwrap_or_default().trim().to_string();
    let filter = (!search.is_empty()).then_some(search.as_str());
    let page = state
        .products()
        .list_products(filter, query.page.unwrap_or(1))
        .await?;
    let toast = take_flash(&session).await?;

    Ok(ProductsIndexTemplate {
        user: UserView::from(&user),
        current_path: PRODUCTS_PATH.to_string(),
        toast,
        products: page.products.iter().map(ProductRowView::from).collect(),
        search_query: search,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total,
    })
}

/// GET /admin/products/create
#[instrument(skip(user, state), fields(user_id = %user.id))]
async fn new_form(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let sample_defaults = state.config().sample_defaults();
    let form = ProductForm::initialize(FormMode::Create, None, sample_defaults);
    ProductFormTemplate::new(&user, &form, create_action())
}

/// POST /admin/products/create
#[instrument(skip_all, fields(user_id = %user.id))]
async fn create_form_post(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let fields = FormFields::from_multipart(multipart, state.config().uploads.max_bytes).await?;
    apply_intent(&state, &session, &user, FormMode::Create, create_action(), fields).await
}

/// GET /admin/products/{id}
#[instrument(skip(user, state), fields(user_id = %user.id))]
async fn edit_form(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .products()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mode = FormMode::Update {
        product_id: Some(product.id),
    };
    let form = ProductForm::initialize(mode, Some(&product), false);
    Ok(ProductFormTemplate::new(&user, &form, update_action(id)))
}

/// POST /admin/products/{id}
///
/// The identity key comes from the form's hidden `product_id`; the path
/// only addresses the page.
#[instrument(skip_all, fields(user_id = %user.id, product = %id))]
async fn update_form_post(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let fields = FormFields::from_multipart(multipart, state.config().uploads.max_bytes).await?;
    let mode = FormMode::Update {
        product_id: fields.product_id()?,
    };
    apply_intent(&state, &session, &user, mode, update_action(id), fields).await
}

/// POST /admin/products/{id}/delete
#[instrument(skip(user, state, session), fields(user_id = %user.id))]
async fn delete(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    let response = state.products().delete_product(id).await;
    let toast = if response.success {
        Toast::info(response.message)
    } else {
        Toast::destructive(response.message)
    };
    push_flash(&session, &toast).await?;

    Ok(Redirect::to(PRODUCTS_PATH))
}

fn create_action() -> String {
    format!("{PRODUCTS_PATH}/create")
}

fn update_action(id: ProductId) -> String {
    format!("{PRODUCTS_PATH}/{id}")
}

/// Rebuild the form from the post, apply the intent and respond.
async fn apply_intent(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    mode: FormMode,
    action: String,
    mut fields: FormFields,
) -> Result<Response, AppError> {
    let intent = fields.intent()?;
    let mut form = ProductForm::from_parts(mode, fields.draft()?, fields.pending());
    tracing::debug!(?intent, "applying form intent");

    let mut status = StatusCode::OK;
    match intent {
        FormIntent::Submit => match form.submit(state.products()).await {
            SubmitOutcome::Navigate { to, flash } => {
                if let Some(toast) = flash {
                    push_flash(session, &toast).await?;
                }
                return Ok(Redirect::to(to).into_response());
            }
            SubmitOutcome::Invalid => status = StatusCode::UNPROCESSABLE_ENTITY,
            SubmitOutcome::Rejected => {}
        },
        FormIntent::GenerateSlug => form.generate_slug(),
        FormIntent::AddEntry(field) => {
            form.commit_pending(field);
        }
        FormIntent::RemoveEntry(field, value) => form.remove_entry(field, &value),
        FormIntent::RemoveImage(url) => form.remove_image(&url),
        FormIntent::UploadImage => {
            let result = match fields.take_image() {
                Ok(file) => state.images().upload(file).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(images) => form.upload_completed(&images),
                Err(e) => {
                    tracing::warn!(error = %e, "image upload failed");
                    form.upload_failed(&e.to_string());
                }
            }
        }
        FormIntent::CommitPending => form.commit_all_pending(),
    }

    Ok((status, ProductFormTemplate::new(user, &form, action)).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn index_template(search_query: &str, page: u32, total_pages: u32) -> ProductsIndexTemplate {
        ProductsIndexTemplate {
            user: UserView {
                name: "Ops".to_string(),
                email: "ops@example.com".to_string(),
            },
            current_path: PRODUCTS_PATH.to_string(),
            toast: None,
            products: Vec::new(),
            search_query: search_query.to_string(),
            page,
            total_pages,
            total: 0,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(&Decimal::new(4999, 2)), "$49.99");
        assert_eq!(format_price(&Decimal::from(5)), "$5.00");
    }

    #[test]
    fn test_page_links() {
        let first = index_template("", 1, 3);
        assert_eq!(first.prev_link(), None);
        assert_eq!(first.next_link().as_deref(), Some("/admin/products?page=2"));

        let last = index_template("red shoe", 3, 3);
        assert_eq!(
            last.prev_link().as_deref(),
            Some("/admin/products?query=red+shoe&page=2")
        );
        assert_eq!(last.next_link(), None);
    }

    #[test]
    fn test_form_view_errors() {
        let mut form = ProductForm::initialize(FormMode::Create, None, false);
        form.set_pending(ListField::Tags, "New");
        let view = FormView::from(&form);
        assert_eq!(view.error("name"), "");
        assert_eq!(view.lists.len(), 3);
        assert_eq!(view.lists[2].pending, "New");
        assert_eq!(view.rating_distribution, "[]");
    }
}
