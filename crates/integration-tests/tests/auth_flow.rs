//! Authentication flows: login, registration validation, logout, reset.

use greenbasket_integration_tests::{TEST_EMAIL, TEST_PASSWORD, TEST_RESET_CODE, TestContext, location};

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/auth/login",
            &[("email", TEST_EMAIL), ("password", "wrong-password")],
        )
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/auth/login?error=credentials");
}

#[tokio::test]
async fn login_rejects_malformed_email_without_remote_call() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/auth/login",
            &[("email", "not-an-email"), ("password", "whatever")],
        )
        .await;
    assert_eq!(location(&response), "/auth/login?error=invalid_email");
}

#[tokio::test]
async fn login_success_reaches_account_page() {
    let ctx = TestContext::new().await;

    ctx.sign_in().await;

    let response = ctx.get("/account").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Test Customer"));
    assert!(body.contains(TEST_EMAIL));
}

#[tokio::test]
async fn account_requires_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/account").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn register_validation_short_circuits() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "New Customer"),
                ("email", "new@example.com"),
                ("phone", "0123"),
                ("password", "secret123"),
                ("password_confirm", "secret123"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/auth/register?error=invalid_phone");

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "New Customer"),
                ("email", "new@example.com"),
                ("phone", "01012345678"),
                ("password", "secret123"),
                ("password_confirm", "different"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/auth/register?error=password_mismatch");
}

#[tokio::test]
async fn register_success_redirects_to_login() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/auth/register",
            &[
                ("name", "New Customer"),
                ("email", "new@example.com"),
                ("phone", "01012345678"),
                ("password", "secret123"),
                ("password_confirm", "secret123"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/auth/login?success=registered");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let ctx = TestContext::new().await;

    ctx.sign_in().await;

    let response = ctx.post_form("/auth/logout", &[]).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");

    let response = ctx.get("/account").await;
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn password_reset_flow_signs_in() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/auth/forgot-password", &[("email", TEST_EMAIL)])
        .await;
    assert_eq!(location(&response), "/auth/verify-code?success=code_sent");

    let response = ctx
        .post_form("/auth/verify-code", &[("reset_code", TEST_RESET_CODE)])
        .await;
    assert_eq!(location(&response), "/auth/reset-password");

    let response = ctx
        .post_form(
            "/auth/reset-password",
            &[
                ("password", TEST_PASSWORD),
                ("password_confirm", TEST_PASSWORD),
            ],
        )
        .await;
    assert_eq!(location(&response), "/account");

    let response = ctx.get("/account").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn wrong_reset_code_bounces_back() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/auth/verify-code", &[("reset_code", "000000")])
        .await;
    assert_eq!(location(&response), "/auth/verify-code?error=invalid_code");
}
