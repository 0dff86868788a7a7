//! Guest cart lifecycle: add, update, remove, clear, badge count.

use greenbasket_integration_tests::{PRODUCT_SHAWL, PRODUCT_TSHIRT, TestContext, location};

#[tokio::test]
async fn guest_add_returns_badge_and_trigger() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    let body = response.text().await.unwrap();
    assert!(body.contains('1'));
}

#[tokio::test]
async fn guest_add_without_htmx_redirects_to_cart() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn guest_cart_page_shows_lines_and_subtotal() {
    let ctx = TestContext::new().await;

    ctx.post_fragment(
        "/cart/add",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "2")],
    )
    .await;

    let response = ctx.get("/cart").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    // 2 x EGP 149.00
    assert!(body.contains("EGP 298.00"));
    assert!(body.contains("browsing as a guest"));
}

#[tokio::test]
async fn guest_update_quantity_rerenders_items() {
    let ctx = TestContext::new().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;

    let response = ctx
        .post_fragment(
            "/cart/update",
            &[("product_id", PRODUCT_SHAWL), ("quantity", "3")],
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("EGP 447.00"));
}

#[tokio::test]
async fn guest_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;

    let response = ctx
        .post_fragment(
            "/cart/update",
            &[("product_id", PRODUCT_SHAWL), ("quantity", "0")],
        )
        .await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn guest_remove_and_clear() {
    let ctx = TestContext::new().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;
    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_TSHIRT)])
        .await;

    let response = ctx
        .post_fragment("/cart/remove", &[("product_id", PRODUCT_SHAWL)])
        .await;
    let body = response.text().await.unwrap();
    assert!(!body.contains("Woman Shawl"));
    assert!(body.contains("Cotton T-Shirt"));

    let response = ctx.post_fragment("/cart/clear", &[]).await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn guest_badge_counts_units_across_lines() {
    let ctx = TestContext::new().await;

    ctx.post_fragment(
        "/cart/add",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "2")],
    )
    .await;
    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_TSHIRT)])
        .await;

    let response = ctx.get("/cart/count").await;
    let body = response.text().await.unwrap();
    assert!(body.contains('3'));
}

#[tokio::test]
async fn malformed_product_id_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_fragment("/cart/add", &[("product_id", "not-an-object-id")])
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn guest_wishlist_toggle_and_page() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_fragment("/wishlist/toggle", &[("product_id", PRODUCT_SHAWL)])
        .await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("In wishlist"));

    let response = ctx.get("/wishlist").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));

    // Toggling again removes it
    let response = ctx
        .post_fragment("/wishlist/toggle", &[("product_id", PRODUCT_SHAWL)])
        .await;
    let body = response.text().await.unwrap();
    assert!(!body.contains("In wishlist"));

    let response = ctx.get("/wishlist").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Your wishlist is empty"));
}
