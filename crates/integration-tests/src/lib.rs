//! Integration tests for GreenBasket.
//!
//! # How it works
//!
//! Each test spins up two servers on ephemeral ports:
//!
//! 1. A stub commerce API ([`stub`]) speaking the hosted API's JSON shapes,
//!    with in-memory state the test can inspect afterwards.
//! 2. The real storefront router (`greenbasket_storefront::build_app`)
//!    pointed at the stub.
//!
//! Requests are driven with a cookie-holding `reqwest` client so sessions
//! (and with them the guest cart) behave exactly as they do in production.
//!
//! ```bash
//! cargo test -p greenbasket-integration-tests
//! ```

// Test-support code; panicking on broken fixtures is the point.
#![allow(clippy::unwrap_used)]

pub mod stub;

use std::net::SocketAddr;

use secrecy::SecretString;

use greenbasket_storefront::config::{CommerceApiConfig, StorefrontConfig};
use greenbasket_storefront::state::AppState;

pub use stub::{
    PRODUCT_HOODIE, PRODUCT_SHAWL, PRODUCT_TSHIRT, TEST_CART_ID, TEST_CUSTOMER_ID, TEST_EMAIL,
    TEST_NAME, TEST_PASSWORD, TEST_RESET_CODE, TEST_TOKEN,
};

/// A running storefront wired to a running stub commerce API.
pub struct TestContext {
    /// Cookie-holding client with redirects disabled, so tests can assert on
    /// `Location` headers.
    pub client: reqwest::Client,
    /// Base URL of the storefront server.
    pub storefront_url: String,
    /// Handle on the stub API state for assertions.
    pub stub: stub::SharedStub,
}

impl TestContext {
    /// Start the stub API and the storefront, both on ephemeral ports.
    ///
    /// # Panics
    ///
    /// Panics when a listener cannot be bound; tests cannot proceed without one.
    pub async fn new() -> Self {
        let (stub_router, stub_state) = stub::stub_api();
        let stub_addr = spawn_server(stub_router).await;

        let storefront_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront listener");
        let storefront_addr = storefront_listener.local_addr().unwrap();

        let config = StorefrontConfig {
            host: storefront_addr.ip(),
            port: storefront_addr.port(),
            base_url: format!("http://{storefront_addr}"),
            session_secret: SecretString::from("kJ8#mN2$pQ5^rT9&wX3*zA6!bC4@dF7%"),
            commerce: CommerceApiConfig {
                base_url: format!("http://{stub_addr}"),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let app = greenbasket_storefront::build_app(AppState::new(config));
        tokio::spawn(async move {
            axum::serve(storefront_listener, app).await.unwrap();
        });

        // The rate limiter reads the client IP from proxy headers, so send one
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-forwarded-for", "127.0.0.1".parse().unwrap());

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()
            .expect("build http client");

        Self {
            client,
            storefront_url: format!("http://{storefront_addr}"),
            stub: stub_state,
        }
    }

    /// GET a storefront path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.storefront_url))
            .send()
            .await
            .expect("request failed")
    }

    /// POST a form to a storefront path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.storefront_url))
            .form(form)
            .send()
            .await
            .expect("request failed")
    }

    /// POST a form as an HTMX fragment request.
    pub async fn post_fragment(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.storefront_url))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("request failed")
    }

    /// DELETE a storefront path as an HTMX fragment request.
    pub async fn delete_fragment(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{path}", self.storefront_url))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("request failed")
    }

    /// Sign in with the fixture account and follow through to the account page.
    pub async fn sign_in(&self) {
        let response = self
            .post_form(
                "/auth/login",
                &[("email", TEST_EMAIL), ("password", TEST_PASSWORD)],
            )
            .await;
        assert!(
            response.status().is_redirection(),
            "login did not redirect: {}",
            response.status()
        );
        assert_eq!(location(&response), "/account");
    }

    /// Snapshot of the stub-side cart for the fixture token.
    pub fn remote_cart(&self) -> Vec<(String, u32)> {
        self.stub.lock().unwrap().cart_lines(TEST_TOKEN)
    }

    /// Snapshot of the stub-side wishlist for the fixture token.
    pub fn remote_wishlist(&self) -> Vec<String> {
        self.stub
            .lock()
            .unwrap()
            .wishlists
            .get(TEST_TOKEN)
            .cloned()
            .unwrap_or_default()
    }
}

/// The `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn spawn_server(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
