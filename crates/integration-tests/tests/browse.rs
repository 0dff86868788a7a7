//! Browsing flows: health, home, catalog listings, detail pages.

use greenbasket_integration_tests::{PRODUCT_SHAWL, TestContext};

#[tokio::test]
async fn health_endpoints_answer() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = ctx.get("/health/ready").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn home_page_shows_best_sellers_and_categories() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("Women Fashion"));
}

#[tokio::test]
async fn product_listing_and_keyword_search() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/products").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("Cotton T-Shirt"));
    assert!(body.contains("Zip Hoodie"));

    let response = ctx.get("/products?keyword=shawl").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(!body.contains("Zip Hoodie"));
}

#[tokio::test]
async fn product_detail_page() {
    let ctx = TestContext::new().await;

    let response = ctx.get(&format!("/products/{PRODUCT_SHAWL}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("EGP 149.00"));
    assert!(body.contains("Add to cart"));
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/products/000000000000000000000000").await;
    assert_eq!(response.status(), 404);
    let body = response.text().await.unwrap();
    assert!(body.contains("Product Not Found"));
}

#[tokio::test]
async fn category_pages() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/categories").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Women Fashion"));

    let response = ctx.get("/categories/6439d58a0049ad0b52b9003f").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("Women Clothing"));
}

#[tokio::test]
async fn brand_pages() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/brands").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("DeFacto"));

    let response = ctx.get("/brands/64089bbe24b25627a253158b").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/").await;
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.headers().contains_key("x-request-id"));
}
