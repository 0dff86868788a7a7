//! Account flows: addresses, orders, checkout.

use greenbasket_integration_tests::{PRODUCT_SHAWL, TEST_CART_ID, TEST_TOKEN, TestContext, location};

#[tokio::test]
async fn address_create_validates_and_saves() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    let response = ctx
        .post_form(
            "/account/addresses",
            &[
                ("name", "Home"),
                ("details", "12 Nile St"),
                ("city", "Cairo"),
                ("phone", "123"),
            ],
        )
        .await;
    assert_eq!(
        location(&response),
        "/account/addresses/new?error=invalid_phone"
    );

    let response = ctx
        .post_form(
            "/account/addresses",
            &[
                ("name", "Home"),
                ("details", "12 Nile St"),
                ("city", "Cairo"),
                ("phone", "01012345678"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/account/addresses?success=saved");

    let response = ctx.get("/account/addresses").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Home"));
    assert!(body.contains("12 Nile St"));
}

#[tokio::test]
async fn address_delete_rerenders_the_list() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    ctx.post_form(
        "/account/addresses",
        &[
            ("name", "Home"),
            ("details", "12 Nile St"),
            ("city", "Cairo"),
            ("phone", "01012345678"),
        ],
    )
    .await;

    let address_id = {
        let stub = ctx.stub.lock().unwrap();
        stub.addresses[TEST_TOKEN][0]["_id"]
            .as_str()
            .unwrap()
            .to_string()
    };

    let response = ctx
        .delete_fragment(&format!("/account/addresses/{address_id}"))
        .await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("No saved addresses yet"));
}

#[tokio::test]
async fn orders_page_renders_empty_state_without_orders() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    let response = ctx.get("/account/orders").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("No orders yet"));
}

#[tokio::test]
async fn checkout_requires_a_non_empty_cart() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    let response = ctx.get("/checkout").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn cash_checkout_places_an_order() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    ctx.post_fragment(
        "/cart/add",
        &[("product_id", PRODUCT_SHAWL), ("quantity", "2")],
    )
    .await;

    let response = ctx.get("/checkout").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Woman Shawl"));
    assert!(body.contains("EGP 298.00"));

    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("payment_method", "cash"),
                ("details", "12 Nile St"),
                ("city", "Cairo"),
                ("phone", "01012345678"),
            ],
        )
        .await;
    assert_eq!(
        location(&response),
        "/account/orders?success=order_placed"
    );

    // The stub recorded the order and dropped the cart
    assert_eq!(ctx.stub.lock().unwrap().orders.len(), 1);
    assert!(ctx.remote_cart().is_empty());

    let response = ctx.get("/account/orders").await;
    let body = response.text().await.unwrap();
    assert!(body.contains("#1001"));
    assert!(body.contains("EGP 298.00"));
}

#[tokio::test]
async fn card_checkout_redirects_to_hosted_session() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;

    let response = ctx
        .post_form(
            "/checkout",
            &[
                ("payment_method", "card"),
                ("details", "12 Nile St"),
                ("city", "Cairo"),
                ("phone", "01012345678"),
            ],
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(
        location(&response),
        format!("https://pay.example/session/{TEST_CART_ID}")
    );
}

#[tokio::test]
async fn checkout_validates_the_typed_address() {
    let ctx = TestContext::new().await;
    ctx.sign_in().await;

    ctx.post_fragment("/cart/add", &[("product_id", PRODUCT_SHAWL)])
        .await;

    let response = ctx
        .post_form(
            "/checkout",
            &[("payment_method", "cash"), ("details", ""), ("city", "")],
        )
        .await;
    assert_eq!(location(&response), "/checkout?error=missing_fields");
}
