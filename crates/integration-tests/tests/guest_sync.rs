//! Guest-state reconciliation: what a visitor collects before signing in
//! must land on their account, and the guest copy must be gone afterwards.

use greenbasket_integration_tests::{
    PRODUCT_HOODIE, PRODUCT_SHAWL, PRODUCT_TSHIRT, TestContext,
};

#[tokio::test]
async fn login_replays_guest_cart_and_wishlist() {
    let ctx = TestContext::new().await;

    // Collect as a guest: two shawls, one t-shirt, hoodie on the wishlist
    ctx.post_fragment(
        "/cart/add",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "2")],
    )
    .await;
    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_TSHIRT)])
        .await;
    ctx.post_fragment("/wishlist/toggle", &[("product_id", PRODUCT_HOODIE)])
        .await;

    assert!(ctx.remote_cart().is_empty());

    ctx.sign_in().await;

    // The guest lines were replayed with their quantities
    let cart = ctx.remote_cart();
    assert_eq!(
        cart,
        vec![
            (PRODUCT_SHAWL.to_string(), 2),
            (PRODUCT_TSHIRT.to_string(), 1),
        ]
    );
    assert_eq!(ctx.remote_wishlist(), vec![PRODUCT_HOODIE.to_string()]);
}

#[tokio::test]
async fn merged_cart_serves_the_account_views() {
    let ctx = TestContext::new().await;

    ctx.post_fragment(
        "/cart/add",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "2")],
    )
    .await;
    ctx.sign_in().await;

    // Cart page now renders the remote cart
    let response = ctx.get("/cart").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("EGP 298.00"));
    assert!(!body.contains("browsing as a guest"));

    // Wishlist view follows the remote side too
    let response = ctx.get("/wishlist").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Your wishlist is empty"));
}

#[tokio::test]
async fn guest_copy_is_gone_after_merge() {
    let ctx = TestContext::new().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;
    ctx.sign_in().await;

    // Signing out flushes the session; nothing guest-held may survive
    ctx.post_form("/auth/logout", &[]).await;

    let response = ctx.get("/cart").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn authenticated_mutations_hit_the_remote_cart() {
    let ctx = TestContext::new().await;

    ctx.sign_in().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;
    assert_eq!(ctx.remote_cart(), vec![(PRODUCT_SHAWL.to_string(), 1)]);

    ctx.post_fragment(
        "/cart/update",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "4")],
    )
    .await;
    assert_eq!(ctx.remote_cart(), vec![(PRODUCT_SHAWL.to_string(), 4)]);

    ctx.post_fragment("/cart/remove", &[("product_id", PRODUCT_SHAWL)])
        .await;
    assert!(ctx.remote_cart().is_empty());
}
