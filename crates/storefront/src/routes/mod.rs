//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing (pagination, search, sort)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category listing
//! GET  /categories/{id}        - Category detail with products
//! GET  /brands                 - Brand listing (paged)
//! GET  /brands/{id}            - Brand detail with products
//!
//! # Cart (HTMX fragments; work for guests and signed-in customers)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns cart_count fragment)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Drop the whole cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Wishlist (work for guests and signed-in customers)
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/toggle        - Toggle membership (returns button fragment)
//! POST /wishlist/remove        - Remove item (returns wishlist_items fragment)
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Address choice + payment method
//! POST /checkout               - Place cash order or redirect to hosted payment
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (merges guest state)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! GET  /auth/forgot-password   - Request reset code page
//! POST /auth/forgot-password   - Send reset code
//! GET  /auth/verify-code       - Enter reset code page
//! POST /auth/verify-code       - Verify reset code
//! GET  /auth/reset-password    - New password page
//! POST /auth/reset-password    - Set new password (merges guest state)
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! GET  /account/orders         - Order history
//! GET  /account/addresses      - Address list
//! GET  /account/addresses/new  - New address form
//! POST /account/addresses      - Create address
//! DELETE /account/addresses/{id} - Delete address
//! ```

pub mod account;
pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod products;
pub mod wishlist;

use axum::http::HeaderMap;
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, fragment_rate_limiter};
use crate::state::AppState;

/// Whether the request came from HTMX and expects a fragment response.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/verify-code",
            get(auth::verify_code_page).post(auth::verify_code),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the brand routes router.
pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::index))
        .route("/{id}", get(brands::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .layer(fragment_rate_limiter())
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
        .layer(fragment_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route("/addresses/new", get(account::new_address))
        .route("/addresses/{id}", axum::routing::delete(account::delete_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog routes
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/brands", brand_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Wishlist routes
        .nest("/wishlist", wishlist_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place))
        // Account routes
        .nest("/account", account_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
