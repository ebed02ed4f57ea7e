//! Integration test harness for Shopdesk.
//!
//! Tests drive the real admin router in-process. The database-backed
//! collaborators are swapped for in-memory fakes and sessions live in a
//! `MemoryStore`, so no server or database is needed.
//!
//! ```bash
//! cargo test -p shopdesk-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fmt::Write as _;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::extract::{DefaultBodyLimit, Path};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};

use shopdesk_admin::config::{AdminConfig, Environment, UploadConfig};
use shopdesk_admin::db::{ProductPage, ProductStats, RepositoryError};
use shopdesk_admin::middleware::{SESSION_COOKIE_NAME, create_session_layer, set_current_user};
use shopdesk_admin::models::CurrentUser;
use shopdesk_admin::routes;
use shopdesk_admin::services::products::{CREATED, DELETED, ProductActions, UPDATED};
use shopdesk_admin::services::uploads::{ImageStore, ImageUpload, UploadError, UploadedImage};
use shopdesk_admin::state::AppState;
use shopdesk_core::{
    ActionResponse, Product, ProductId, ProductInput, ProductUpdate, ReviewStats, Slug, UserId,
    UserRole,
};

const BOUNDARY: &str = "shopdesk-test-boundary";

/// Size of the frames a request body is streamed in, as a socket would.
const BODY_CHUNK_BYTES: usize = 64 * 1024;

/// Configuration for an in-process console.
#[must_use]
pub fn test_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from("postgres://shopdesk@localhost/shopdesk_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        environment: Environment::Development,
        uploads: UploadConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

/// A stored product with the given ID.
#[must_use]
pub fn sample_product(id: i32) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(id),
        details: ProductInput {
            name: "Red Shoe".to_string(),
            slug: Slug::parse("red-shoe").unwrap(),
            category: "Shoes".to_string(),
            brand: "Stride".to_string(),
            description: "A red shoe.".to_string(),
            price: Decimal::new(4999, 2),
            list_price: Decimal::new(5999, 2),
            count_in_stock: 3,
            is_published: true,
            images: vec!["/uploads/red-shoe.png".to_string()],
            sizes: vec!["42".to_string()],
            colors: vec!["Red".to_string()],
            tags: Vec::new(),
            reviews: ReviewStats::default(),
        },
        created_at: now,
        updated_at: now,
    }
}

/// Product actions that record every call.
#[derive(Debug, Default)]
pub struct FakeActions {
    pub created: Mutex<Vec<ProductInput>>,
    pub updated: Mutex<Vec<ProductUpdate>>,
    pub deleted: Mutex<Vec<ProductId>>,
    pub products: Mutex<Vec<Product>>,
    /// When set, every mutation fails with this message.
    pub reject_with: Mutex<Option<String>>,
}

impl FakeActions {
    fn outcome(&self, success: &str) -> ActionResponse {
        self.reject_with
            .lock()
            .unwrap()
            .clone()
            .map_or_else(|| ActionResponse::ok(success), ActionResponse::fail)
    }
}

#[async_trait]
impl ProductActions for FakeActions {
    async fn create_product(&self, input: ProductInput) -> ActionResponse {
        self.created.lock().unwrap().push(input);
        self.outcome(CREATED)
    }

    async fn update_product(&self, update: ProductUpdate) -> ActionResponse {
        self.updated.lock().unwrap().push(update);
        self.outcome(UPDATED)
    }

    async fn delete_product(&self, id: ProductId) -> ActionResponse {
        self.deleted.lock().unwrap().push(id);
        self.outcome(DELETED)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_products(
        &self,
        _query: Option<&str>,
        page: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let products = self.products.lock().unwrap().clone();
        let total = i64::try_from(products.len()).unwrap();
        Ok(ProductPage {
            products,
            page: page.max(1),
            total_pages: 1,
            total,
        })
    }

    async fn product_stats(&self) -> Result<ProductStats, RepositoryError> {
        let products = self.products.lock().unwrap().clone();
        Ok(ProductStats {
            total: i64::try_from(products.len()).unwrap(),
            published: i64::try_from(products.iter().filter(|p| p.details.is_published).count())
                .unwrap(),
            out_of_stock: 0,
            latest: products,
        })
    }
}

/// Image store that keeps nothing and answers with a predictable URL.
#[derive(Debug, Default)]
pub struct FakeImages {
    pub uploads: Mutex<Vec<ImageUpload>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, file: ImageUpload) -> Result<Vec<UploadedImage>, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let name = file.file_name.clone().unwrap_or_default();
        self.uploads.lock().unwrap().push(file);
        Ok(vec![UploadedImage {
            url: format!("/uploads/fake-{name}"),
        }])
    }
}

/// A file part for [`TestApp::post_form_with_file`].
#[derive(Debug, Clone)]
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// The admin router wired to fakes.
pub struct TestApp {
    router: Router,
    pub actions: Arc<FakeActions>,
    pub images: Arc<FakeImages>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the app. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let config = test_config();
        let actions = Arc::new(FakeActions::default());
        let images = Arc::new(FakeImages::default());

        // Never connected: every handler under test goes through the fakes
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://shopdesk@localhost/shopdesk_test")
            .unwrap();

        let state = AppState::with_services(config.clone(), pool, actions.clone(), images.clone());

        let router = Router::new()
            .route("/test/sign-in/{role}", post(sign_in))
            .merge(routes::routes())
            .layer(DefaultBodyLimit::max(config.uploads.request_body_limit()))
            .layer(create_session_layer(MemoryStore::default(), &config))
            .with_state(state);

        Self {
            router,
            actions,
            images,
        }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sign in with the given role and return the session cookie.
    pub async fn sign_in(&self, role: UserRole) -> String {
        let response = self
            .request(
                Request::post(format!("/test/sign-in/{role}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        session_cookie(response.headers()).unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.request(request.body(Body::empty()).unwrap()).await
    }

    /// POST with no body, as a plain button form does.
    pub async fn post(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::post(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.request(request.body(Body::empty()).unwrap()).await
    }

    /// POST a multipart form; repeated names are sent as repeated parts.
    pub async fn post_form(
        &self,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        self.post_multipart(path, cookie, multipart_body(fields, None))
            .await
    }

    /// POST a multipart form with a file in the `image` input.
    pub async fn post_form_with_file(
        &self,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: &FilePart<'_>,
    ) -> Response {
        self.post_multipart(path, cookie, multipart_body(fields, Some(file)))
            .await
    }

    async fn post_multipart(&self, path: &str, cookie: Option<&str>, body: Vec<u8>) -> Response {
        let mut request = Request::post(path).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = body
            .chunks(BODY_CHUNK_BYTES)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        let body = Body::from_stream(futures::stream::iter(chunks));
        self.request(request.body(body).unwrap()).await
    }
}

async fn sign_in(session: Session, Path(role): Path<String>) -> StatusCode {
    let Ok(role) = role.parse::<UserRole>() else {
        return StatusCode::BAD_REQUEST;
    };
    let user = CurrentUser {
        id: UserId::new(1),
        email: "ops@example.com".to_string(),
        name: "Ops".to_string(),
        role,
    };
    match set_current_user(&session, &user).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<&FilePart<'_>>) -> Vec<u8> {
    let mut text = String::new();
    for (name, value) in fields {
        write!(
            text,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .unwrap();
    }

    let mut body = text.into_bytes();
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The `name=value` pair of the session cookie, if one was set.
#[must_use]
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_string)
}

/// Redirect target of a response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Read the whole body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
