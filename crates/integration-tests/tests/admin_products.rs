//! Integration tests for the admin product pages.
//!
//! Run with: cargo test -p shopdesk-integration-tests

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use shopdesk_core::{ProductId, UserRole};
use shopdesk_integration_tests::{FilePart, TestApp, body_text, location, sample_product};

/// A create post that passes validation.
fn valid_create<'a>(intent: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", "Red Shoe"),
        ("slug", "red-shoe"),
        ("category", "Shoes"),
        ("brand", "Stride"),
        ("description", "A red shoe."),
        ("price", "49.99"),
        ("list_price", "59.99"),
        ("count_in_stock", "3"),
        ("images", "/uploads/red-shoe.png"),
        ("sizes", "42"),
        ("intent", intent),
    ]
}

// ============================================================================
// Role Gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_requests_are_sent_home() {
    let app = TestApp::new();

    for path in ["/admin", "/admin/overview", "/admin/products", "/admin/products/create"] {
        let response = app.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/"), "{path}");
    }
}

#[tokio::test]
async fn test_non_admin_is_sent_home() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::User).await;

    let response = app.get("/admin/overview", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let response = app
        .post_form("/admin/products/create", Some(&cookie), &valid_create("submit"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.actions.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_sees_overview() {
    let app = TestApp::new();
    app.actions.products.lock().unwrap().push(sample_product(7));
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admin/overview"));

    let response = app.get("/admin/overview", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Overview"));
    assert!(body.contains("Red Shoe"));
}

#[tokio::test]
async fn test_logout_closes_admin_pages() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.post("/auth/logout", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/"));

    let response = app.get("/admin/overview", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_home_page_is_public() {
    let app = TestApp::new();
    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("You are not signed in."));
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_form_starts_with_sample_defaults() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.get("/admin/products/create", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("This is a sample description of the product."));
    assert!(body.contains(r#"value="99.99""#));
}

#[tokio::test]
async fn test_invalid_create_is_not_sent() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[("name", ""), ("price", "abc"), ("intent", "submit")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Name must be at least 3 characters"));
    assert!(body.contains("Product must have at least one image"));
    assert!(app.actions.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_successful_create_redirects_with_toast() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form("/admin/products/create", Some(&cookie), &valid_create("submit"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/products"));

    let created = app.actions.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].slug.as_str(), "red-shoe");
    assert_eq!(created[0].sizes, vec!["42"]);

    // The toast survives exactly one redirect
    let body = body_text(app.get("/admin/products", Some(&cookie)).await).await;
    assert!(body.contains("Product created successfully"));
    let body = body_text(app.get("/admin/products", Some(&cookie)).await).await;
    assert!(!body.contains("Product created successfully"));
}

#[tokio::test]
async fn test_rejected_create_stays_on_form() {
    let app = TestApp::new();
    *app.actions.reject_with.lock().unwrap() = Some("Slug already exists".to_string());
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form("/admin/products/create", Some(&cookie), &valid_create("submit"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Slug already exists"));
    // Entered values are kept
    assert!(body.contains(r#"value="Red Shoe""#));
}

// ============================================================================
// Form Interactions
// ============================================================================

#[tokio::test]
async fn test_enter_commits_pending_entries() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    // No intent: the hidden default button
    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[("name", "Red Shoe"), ("pending_size", "XL"), ("pending_tag", "sale")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"name="sizes" value="XL""#));
    assert!(body.contains(r#"name="tags" value="sale""#));
    assert!(app.actions.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_slug_from_name() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[("name", "Red  Shoe!"), ("intent", "generate_slug")],
        )
        .await;

    let body = body_text(response).await;
    assert!(body.contains(r#"name="slug" value="red-shoe""#));
}

#[tokio::test]
async fn test_remove_entry_by_value() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[
                ("colors", "Red"),
                ("colors", "Blue"),
                ("intent", "remove:colors:Red"),
            ],
        )
        .await;

    let body = body_text(response).await;
    assert!(!body.contains(r#"name="colors" value="Red""#));
    assert!(body.contains(r#"name="colors" value="Blue""#));
}

#[tokio::test]
async fn test_upload_appends_image() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form_with_file(
            "/admin/products/create",
            Some(&cookie),
            &[("images", "/uploads/first.png"), ("intent", "upload_image")],
            &FilePart {
                file_name: "shoe.png",
                content_type: "image/png",
                bytes: b"\x89PNG",
            },
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"name="images" value="/uploads/first.png""#));
    assert!(body.contains(r#"name="images" value="/uploads/fake-shoe.png""#));
    assert_eq!(app.images.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_without_file_shows_error() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[("intent", "upload_image")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("ERROR! No file selected"));
}

#[tokio::test]
async fn test_oversized_upload_keeps_draft() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;
    let png = vec![0_u8; 6 * 1024 * 1024];

    let response = app
        .post_form_with_file(
            "/admin/products/create",
            Some(&cookie),
            &[("name", "Red Shoe Draft"), ("intent", "upload_image")],
            &FilePart {
                file_name: "huge.png",
                content_type: "image/png",
                bytes: &png,
            },
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("ERROR! File is too large (max 4194304 bytes)"));
    assert!(body.contains(r#"value="Red Shoe Draft""#));
    assert!(app.images.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_body_past_size_limit_keeps_draft() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;
    // Past the whole-request cap, not just the image cap
    let png = vec![0_u8; 18 * 1024 * 1024];

    let response = app
        .post_form_with_file(
            "/admin/products/create",
            Some(&cookie),
            &[
                ("name", "Red Shoe Draft"),
                ("sizes", "42"),
                ("intent", "upload_image"),
            ],
            &FilePart {
                file_name: "huge.png",
                content_type: "image/png",
                bytes: &png,
            },
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("ERROR! File is too large"));
    assert!(body.contains(r#"value="Red Shoe Draft""#));
    assert!(body.contains(r#"name="sizes" value="42""#));
    assert!(app.images.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_intent_is_bad_request() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/create",
            Some(&cookie),
            &[("intent", "add:images")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Update & Delete
// ============================================================================

#[tokio::test]
async fn test_edit_missing_product_is_not_found() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.get("/admin/products/404", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = TestApp::new();
    app.actions.products.lock().unwrap().push(sample_product(7));
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.get("/admin/products/7", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"name="product_id" value="7""#));
    assert!(body.contains(r#"value="Red Shoe""#));
    assert!(body.contains("Update Product"));
}

#[tokio::test]
async fn test_update_sends_patch_and_redirects() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/7",
            Some(&cookie),
            &[("product_id", "7"), ("name", "Blue Shoe"), ("intent", "submit")],
        )
        .await;

    assert_eq!(location(&response), Some("/admin/products"));
    let updated = app.actions.updated.lock().unwrap().clone();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, ProductId::new(7));
    assert_eq!(updated[0].changes.name.as_deref(), Some("Blue Shoe"));
    assert_eq!(updated[0].changes.price, None);
}

#[tokio::test]
async fn test_update_without_id_redirects_without_sending() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/7",
            Some(&cookie),
            &[("product_id", ""), ("name", "Blue Shoe"), ("intent", "submit")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/products"));
    assert!(app.actions.updated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_update_is_not_sent() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app
        .post_form(
            "/admin/products/7",
            Some(&cookie),
            &[("product_id", "7"), ("price", "1.234"), ("intent", "submit")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body_text(response)
            .await
            .contains("Price must have exactly two decimal places")
    );
    assert!(app.actions.updated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_redirects_with_toast() {
    let app = TestApp::new();
    let cookie = app.sign_in(UserRole::Admin).await;

    let response = app.post("/admin/products/3/delete", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/admin/products"));
    assert_eq!(*app.actions.deleted.lock().unwrap(), vec![ProductId::new(3)]);

    let body = body_text(app.get("/admin/products", Some(&cookie)).await).await;
    assert!(body.contains("Product deleted successfully"));
}
