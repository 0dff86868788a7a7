//! Guest cart and wishlist state.
//!
//! Unauthenticated visitors keep their cart and wishlist in the session: a
//! plain list mutated by linear scan, push, and filter. There is no ordering
//! or durability guarantee beyond what the session store provides, and the
//! last write to the session wins. Once the visitor signs in, the state is
//! replayed against the remote API by `services::sync` and cleared.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use greenbasket_core::ProductId;

use crate::models::session_keys;

// =============================================================================
// Guest Cart
// =============================================================================

/// A single line in the guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart state for unauthenticated visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestCart {
    lines: Vec<GuestCartLine>,
}

impl GuestCart {
    /// Add `quantity` units of a product.
    ///
    /// An existing line for the product is incremented; otherwise a new line
    /// is pushed.
    pub fn add(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(GuestCartLine {
                product_id: product_id.clone(),
                quantity,
            });
        }
    }

    /// Overwrite the quantity of a product's line.
    ///
    /// Setting 0 removes the line. Setting a quantity for an absent product
    /// adds a line.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = quantity;
        } else {
            self.lines.push(GuestCartLine {
                product_id: product_id.clone(),
                quantity,
            });
        }
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() != before
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The quantity held for a product, if any.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| &l.product_id == product_id)
            .map(|l| l.quantity)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[GuestCartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Guest Wishlist
// =============================================================================

/// Wishlist state for unauthenticated visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestWishlist {
    ids: Vec<ProductId>,
}

impl GuestWishlist {
    /// Add a product. Returns false when it was already present.
    pub fn add(&mut self, product_id: &ProductId) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.ids.push(product_id.clone());
        true
    }

    /// Remove a product. Returns whether it was present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != product_id);
        self.ids.len() != before
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns whether the product is in the wishlist afterwards.
    pub fn toggle(&mut self, product_id: &ProductId) -> bool {
        if self.remove(product_id) {
            false
        } else {
            self.ids.push(product_id.clone());
            true
        }
    }

    /// Whether a product is in the wishlist.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.ids.iter().any(|id| id == product_id)
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// The product ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the guest cart from the session; an absent key reads as empty.
pub async fn load_cart(session: &Session) -> GuestCart {
    session
        .get::<GuestCart>(session_keys::GUEST_CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the guest cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_cart(
    session: &Session,
    cart: &GuestCart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::GUEST_CART, cart).await
}

/// Load the guest wishlist from the session; an absent key reads as empty.
pub async fn load_wishlist(session: &Session) -> GuestWishlist {
    session
        .get::<GuestWishlist>(session_keys::GUEST_WISHLIST)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the guest wishlist back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_wishlist(
    session: &Session,
    wishlist: &GuestWishlist,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::GUEST_WISHLIST, wishlist).await
}

/// Remove both guest keys from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_guest_state(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<GuestCart>(session_keys::GUEST_CART)
        .await?;
    session
        .remove::<GuestWishlist>(session_keys::GUEST_WISHLIST)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(tail: char) -> ProductId {
        ProductId::new(format!("6428ebc6dc1175abc65ca0b{tail}"))
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of(&pid('1')), Some(1));
    }

    #[test]
    fn test_add_existing_line_increments() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 1);
        cart.add(&pid('1'), 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(&pid('1')), Some(3));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 5);
        cart.set_quantity(&pid('1'), 2);
        assert_eq!(cart.quantity_of(&pid('1')), Some(2));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 2);
        cart.set_quantity(&pid('1'), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_absent_adds() {
        let mut cart = GuestCart::default();
        cart.set_quantity(&pid('1'), 4);
        assert_eq!(cart.quantity_of(&pid('1')), Some(4));
    }

    #[test]
    fn test_remove() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 1);
        cart.add(&pid('2'), 2);
        assert!(cart.remove(&pid('1')));
        assert!(!cart.remove(&pid('1')));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 2);
        cart.add(&pid('2'), 3);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_clear() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 2);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_cart_serde_is_a_plain_array() {
        let mut cart = GuestCart::default();
        cart.add(&pid('1'), 2);
        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));

        let parsed: GuestCart = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cart);
    }

    #[test]
    fn test_wishlist_add_is_idempotent() {
        let mut wishlist = GuestWishlist::default();
        assert!(wishlist.add(&pid('1')));
        assert!(!wishlist.add(&pid('1')));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_wishlist_toggle() {
        let mut wishlist = GuestWishlist::default();
        assert!(wishlist.toggle(&pid('1')));
        assert!(wishlist.contains(&pid('1')));
        assert!(!wishlist.toggle(&pid('1')));
        assert!(!wishlist.contains(&pid('1')));
    }

    #[test]
    fn test_wishlist_remove() {
        let mut wishlist = GuestWishlist::default();
        wishlist.add(&pid('1'));
        assert!(wishlist.remove(&pid('1')));
        assert!(!wishlist.remove(&pid('1')));
        assert!(wishlist.is_empty());
    }
}
