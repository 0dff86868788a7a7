//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use greenbasket_core::CustomerId;

/// Session-stored customer identity.
///
/// Holds the remote API token alongside the identity resolved from it at
/// sign-in. The token is only ever sent back to the remote API in the
/// `token` header; it never appears in rendered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer id decoded from the token at sign-in.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Remote API bearer token.
    token: String,
}

impl CurrentCustomer {
    /// Create a new session identity.
    #[must_use]
    pub fn new(id: CustomerId, name: String, email: String, token: String) -> Self {
        Self {
            id,
            name,
            email,
            token,
        }
    }

    /// The remote API token for the `token` request header.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Session keys for authentication and guest state.
pub mod keys {
    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the guest (unauthenticated) cart.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the guest (unauthenticated) wishlist.
    pub const GUEST_WISHLIST: &str = "guest_wishlist";

    /// Key for the email awaiting a password-reset code.
    pub const PENDING_RESET_EMAIL: &str = "pending_reset_email";
}
