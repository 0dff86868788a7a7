//! Remote commerce API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; every response shape is a documented JSON
//!   envelope declared in [`types`]
//! - The remote API is the source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses (5 minute TTL);
//!   cart, wishlist, address, order, and auth calls are never cached
//!
//! # Authentication
//!
//! The remote API issues a bearer token from its signin/signup endpoints and
//! expects it back verbatim in a `token` request header. The client takes the
//! token as an argument on every call that needs one; storing it is the
//! session layer's job.
//!
//! # Example
//!
//! ```rust,ignore
//! use greenbasket_storefront::commerce::CommerceClient;
//!
//! let client = CommerceClient::new(&config.commerce);
//!
//! // Browse the catalog
//! let page = client.get_products(&ProductQuery::default()).await?;
//!
//! // Sign in and read the customer's cart
//! let auth = client.sign_in("user@example.com", "secret123").await?;
//! let cart = client.get_cart(&auth.token).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the remote commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a failure status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or a synthesized fallback.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token was missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the remote API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl CommerceError {
    /// Whether the error means the stored customer token is no longer usable.
    #[must_use]
    pub const fn is_stale_token(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_error_display() {
        let err = CommerceError::NotFound("product 6428ebc6dc1175abc65ca0b9".to_string());
        assert_eq!(
            err.to_string(),
            "Not found: product 6428ebc6dc1175abc65ca0b9"
        );

        let err = CommerceError::Api {
            status: 400,
            message: "Invalid cart".to_string(),
        };
        assert_eq!(err.to_string(), "API error (400): Invalid cart");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CommerceError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_stale_token() {
        assert!(CommerceError::Unauthorized.is_stale_token());
        assert!(!CommerceError::NotFound("x".to_string()).is_stale_token());
    }
}
