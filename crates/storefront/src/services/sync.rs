//! Guest-state reconciliation.
//!
//! When a visitor signs in, whatever they collected as a guest is replayed
//! against the remote cart and wishlist APIs, then the guest keys are
//! cleared. The merge is one-shot and best-effort: a failing line is logged
//! and skipped, there is no retry, and the guest's quantity wins over
//! whatever the server held for the same product.

use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::commerce::CommerceClient;
use crate::models::guest;

/// Counts from a guest-state merge, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Cart lines replayed successfully.
    pub cart_lines: usize,
    /// Cart lines skipped after a remote failure.
    pub cart_failures: usize,
    /// Wishlist entries replayed successfully.
    pub wishlist_items: usize,
    /// Wishlist entries skipped after a remote failure.
    pub wishlist_failures: usize,
}

impl MergeOutcome {
    /// Whether anything was replayed.
    #[must_use]
    pub const fn merged_anything(&self) -> bool {
        self.cart_lines > 0 || self.wishlist_items > 0
    }

    /// Whether every line made it to the server.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.cart_failures == 0 && self.wishlist_failures == 0
    }
}

/// Replay session-held guest cart and wishlist state against the remote API.
///
/// Called with a freshly issued customer token right after sign-in. Guest
/// keys are cleared afterwards regardless of per-line outcomes; a half-merged
/// cart is still authoritative on the server side (last write wins).
#[instrument(skip_all)]
pub async fn merge_guest_state(
    client: &CommerceClient,
    session: &Session,
    token: &str,
) -> MergeOutcome {
    let cart = guest::load_cart(session).await;
    let wishlist = guest::load_wishlist(session).await;
    let mut outcome = MergeOutcome::default();

    for line in cart.lines() {
        match client.add_to_cart(token, &line.product_id).await {
            Ok(_) => {
                // The add endpoint only puts one unit in the cart; overwrite
                // the count for multi-unit lines.
                if line.quantity > 1
                    && let Err(e) = client
                        .set_cart_item_count(token, &line.product_id, line.quantity)
                        .await
                {
                    warn!(
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        error = %e,
                        "Failed to set line quantity during guest cart merge"
                    );
                    outcome.cart_failures += 1;
                    continue;
                }
                outcome.cart_lines += 1;
            }
            Err(e) => {
                warn!(
                    product_id = %line.product_id,
                    error = %e,
                    "Skipping cart line during guest cart merge"
                );
                outcome.cart_failures += 1;
            }
        }
    }

    for product_id in wishlist.ids() {
        match client.add_to_wishlist(token, product_id).await {
            Ok(_) => outcome.wishlist_items += 1,
            Err(e) => {
                warn!(
                    product_id = %product_id,
                    error = %e,
                    "Skipping wishlist entry during guest merge"
                );
                outcome.wishlist_failures += 1;
            }
        }
    }

    if let Err(e) = guest::clear_guest_state(session).await {
        warn!(error = %e, "Failed to clear guest state after merge");
    }

    if outcome.merged_anything() || !outcome.is_clean() {
        info!(
            cart_lines = outcome.cart_lines,
            cart_failures = outcome.cart_failures,
            wishlist_items = outcome.wishlist_items,
            wishlist_failures = outcome.wishlist_failures,
            "Merged guest state into customer account"
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_flags() {
        let outcome = MergeOutcome::default();
        assert!(!outcome.merged_anything());
        assert!(outcome.is_clean());

        let outcome = MergeOutcome {
            cart_lines: 2,
            cart_failures: 1,
            ..MergeOutcome::default()
        };
        assert!(outcome.merged_anything());
        assert!(!outcome.is_clean());
    }
}
