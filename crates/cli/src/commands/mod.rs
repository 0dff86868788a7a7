//! CLI command implementations.

pub mod catalog;
pub mod check;

use greenbasket_storefront::commerce::CommerceClient;
use greenbasket_storefront::config::{CommerceApiConfig, DEFAULT_COMMERCE_API_BASE_URL};

/// Build a commerce client from `COMMERCE_API_BASE_URL` (or the default).
pub(crate) fn client_from_env() -> CommerceClient {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("COMMERCE_API_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_COMMERCE_API_BASE_URL.to_string());

    CommerceClient::new(&CommerceApiConfig { base_url })
}
