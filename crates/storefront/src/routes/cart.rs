//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads and
//! degrade to plain form posts with redirects when HTMX is absent.
//!
//! Every operation works in two modes:
//! - **signed in**: the remote cart API is authoritative; mutations go out
//!   with the session token and the cart is re-fetched for display
//! - **guest**: the cart lives in the session as a plain line list; product
//!   details are hydrated from the (cached) catalog when the page renders

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greenbasket_core::ProductId;

use crate::commerce::CommerceError;
use crate::commerce::types::{Cart as RemoteCart, CartLine};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{CspNonce, OptionalCustomer};
use crate::models::CurrentCustomer;
use crate::models::guest::{self, GuestCart};
use crate::routes::is_htmx;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: greenbasket_core::Price::ZERO.to_string(),
            item_count: 0,
        }
    }
}

impl From<&RemoteCart> for CartView {
    fn from(cart: &RemoteCart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.total.to_string(),
            item_count: cart.item_count,
        }
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let (title, image) = line.product.populated().map_or_else(
            || ("Unavailable product".to_string(), None),
            |product| (product.title.clone(), Some(product.image_cover.clone())),
        );
        Self {
            product_id: line.product.id().to_string(),
            title,
            image,
            quantity: line.count,
            price: line.unit_price().to_string(),
            line_price: line.line_total().to_string(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub signed_in: bool,
    pub nonce: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// View Assembly
// =============================================================================

/// Build the current cart view for either mode.
async fn current_cart_view(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> CartView {
    match customer {
        Some(customer) => match state.commerce().get_cart(customer.token()).await {
            Ok(cart) => CartView::from(&cart),
            // A customer with no cart yet is a 404 on the remote side
            Err(CommerceError::NotFound(_)) => CartView::empty(),
            Err(e) => {
                if e.is_stale_token() {
                    tracing::warn!("Session token rejected by the remote API");
                } else {
                    tracing::warn!("Failed to fetch remote cart: {e}");
                }
                CartView::empty()
            }
        },
        None => guest_cart_view(state, &guest::load_cart(session).await).await,
    }
}

/// Hydrate a guest cart into display data via the cached catalog.
async fn guest_cart_view(state: &AppState, cart: &GuestCart) -> CartView {
    let mut items = Vec::with_capacity(cart.lines().len());
    let mut subtotal = greenbasket_core::Price::ZERO;

    for line in cart.lines() {
        match state.commerce().get_product(&line.product_id).await {
            Ok(product) => {
                let unit = product.effective_price();
                let line_total = unit.times(line.quantity);
                subtotal = subtotal + line_total;
                items.push(CartItemView {
                    product_id: product.id.to_string(),
                    title: product.title.clone(),
                    image: Some(product.image_cover.clone()),
                    quantity: line.quantity,
                    price: unit.to_string(),
                    line_price: line_total.to_string(),
                });
            }
            Err(e) => {
                // Keep the line visible so the visitor can remove it
                tracing::warn!(product_id = %line.product_id, "Failed to hydrate guest cart line: {e}");
                items.push(CartItemView {
                    product_id: line.product_id.to_string(),
                    title: "Unavailable product".to_string(),
                    image: None,
                    quantity: line.quantity,
                    price: String::new(),
                    line_price: String::new(),
                });
            }
        }
    }

    CartView {
        items,
        subtotal: subtotal.to_string(),
        item_count: cart.item_count(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, customer, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let cart = current_cart_view(&state, &session, customer.as_ref()).await;

    CartShowTemplate {
        cart,
        signed_in: customer.is_some(),
        nonce,
    }
}

/// Add item to cart.
///
/// Returns the cart count badge fragment with an HTMX trigger so other
/// cart-bound elements refresh, or redirects to the cart page for plain
/// form posts.
#[instrument(skip(state, session, customer, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(form.product_id);
    if !product_id.is_well_formed() {
        return Err(AppError::BadRequest("Unknown product".to_string()));
    }
    let quantity = form.quantity.unwrap_or(1).max(1);

    let count = match customer {
        Some(customer) => {
            let token = customer.token();
            let summary = state.commerce().add_to_cart(token, &product_id).await?;
            // The add endpoint puts a single unit in the cart; overwrite
            // the count when the form asked for more.
            if quantity > 1 {
                match state
                    .commerce()
                    .set_cart_item_count(token, &product_id, quantity)
                    .await
                {
                    Ok(summary) => summary.item_count,
                    Err(e) => {
                        tracing::warn!("Failed to set quantity after add: {e}");
                        summary.item_count
                    }
                }
            } else {
                summary.item_count
            }
        }
        None => {
            let mut cart = guest::load_cart(&session).await;
            cart.add(&product_id, quantity);
            guest::store_cart(&session, &cart).await?;
            cart.item_count()
        }
    };

    let response = if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    };
    Ok(response)
}

/// Update cart item quantity.
///
/// Quantity 0 removes the line. Returns the cart items fragment, or
/// redirects for plain form posts.
#[instrument(skip(state, session, customer, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    match &customer {
        Some(customer) => {
            let token = customer.token();
            let result = if form.quantity == 0 {
                state.commerce().remove_cart_item(token, &product_id).await
            } else {
                state
                    .commerce()
                    .set_cart_item_count(token, &product_id, form.quantity)
                    .await
            };
            if let Err(e) = result {
                tracing::error!("Failed to update remote cart: {e}");
            }
        }
        None => {
            let mut cart = guest::load_cart(&session).await;
            cart.set_quantity(&product_id, form.quantity);
            if let Err(e) = guest::store_cart(&session, &cart).await {
                tracing::error!("Failed to save guest cart to session: {e}");
            }
        }
    }

    let cart = current_cart_view(&state, &session, customer.as_ref()).await;
    if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Remove item from cart.
#[instrument(skip(state, session, customer, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    match &customer {
        Some(customer) => {
            if let Err(e) = state
                .commerce()
                .remove_cart_item(customer.token(), &product_id)
                .await
            {
                tracing::error!("Failed to remove from remote cart: {e}");
            }
        }
        None => {
            let mut cart = guest::load_cart(&session).await;
            cart.remove(&product_id);
            if let Err(e) = guest::store_cart(&session, &cart).await {
                tracing::error!("Failed to save guest cart to session: {e}");
            }
        }
    }

    let cart = current_cart_view(&state, &session, customer.as_ref()).await;
    if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Drop the whole cart.
#[instrument(skip(state, session, customer, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
) -> Response {
    match &customer {
        Some(customer) => {
            if let Err(e) = state.commerce().clear_cart(customer.token()).await {
                tracing::error!("Failed to clear remote cart: {e}");
            }
        }
        None => {
            let mut cart = guest::load_cart(&session).await;
            cart.clear();
            if let Err(e) = guest::store_cart(&session, &cart).await {
                tracing::error!("Failed to save guest cart to session: {e}");
            }
        }
    }

    if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::empty(),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
) -> impl IntoResponse {
    let count = match customer {
        Some(customer) => state
            .commerce()
            .get_cart(customer.token())
            .await
            .map(|cart| cart.item_count)
            .unwrap_or(0),
        None => guest::load_cart(&session).await.item_count(),
    };

    CartCountTemplate { count }
}
