//! Checkout route handlers.
//!
//! Checkout requires a signed-in customer and a non-empty remote cart. Cash
//! orders are placed directly; card payments redirect to the remote API's
//! hosted checkout session. Order processing itself is entirely the remote
//! API's business.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use greenbasket_core::{AddressId, Phone};

use crate::commerce::CommerceError;
use crate::commerce::types::ShippingAddressInput;
use crate::filters;
use crate::middleware::{CspNonce, auth::RequireCustomer};
use crate::routes::account::AddressView;
use crate::routes::cart::CartView;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Checkout form data.
///
/// Either a saved address id or a typed-in shipping address, plus the
/// payment method.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub payment_method: String,
    pub address_id: Option<String>,
    pub details: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub error: Option<String>,
    pub nonce: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page: cart summary, saved addresses, payment method.
#[instrument(skip(state, customer, nonce))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    axum::extract::Query(query): axum::extract::Query<MessageQuery>,
    CspNonce(nonce): CspNonce,
) -> Response {
    let cart = match state.commerce().get_cart(customer.token()).await {
        Ok(cart) => cart,
        Err(CommerceError::NotFound(_)) => {
            return Redirect::to("/cart").into_response();
        }
        Err(e) => {
            tracing::error!("Failed to fetch cart for checkout: {e}");
            return Redirect::to("/cart").into_response();
        }
    };
    if cart.lines.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let addresses = match state.commerce().get_addresses(customer.token()).await {
        Ok(addresses) => addresses.iter().map(AddressView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch addresses for checkout: {e}");
            Vec::new()
        }
    };

    CheckoutTemplate {
        cart: CartView::from(&cart),
        addresses,
        error: query.error,
        nonce,
    }
    .into_response()
}

/// Handle checkout submission.
#[instrument(skip(state, customer, form))]
pub async fn place(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let token = customer.token();

    // The order endpoints want the cart id, so re-read the cart
    let cart = match state.commerce().get_cart(token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Checkout without a usable cart: {e}");
            return Redirect::to("/cart").into_response();
        }
    };
    if cart.lines.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let shipping = match resolve_shipping(&state, token, &form).await {
        Ok(shipping) => shipping,
        Err(error_code) => {
            return Redirect::to(&format!("/checkout?error={error_code}")).into_response();
        }
    };

    match form.payment_method.as_str() {
        "cash" => match state
            .commerce()
            .create_cash_order(token, &cart.id, &shipping)
            .await
        {
            Ok(order) => {
                tracing::info!(order_id = %order.id, "Cash order placed");
                Redirect::to("/account/orders?success=order_placed").into_response()
            }
            Err(e) => {
                tracing::error!("Failed to place cash order: {e}");
                Redirect::to("/checkout?error=order_failed").into_response()
            }
        },
        "card" => {
            let return_url = &state.config().base_url;
            match state
                .commerce()
                .create_checkout_session(token, &cart.id, return_url)
                .await
            {
                Ok(url) => Redirect::to(&url).into_response(),
                Err(e) => {
                    tracing::error!("Failed to create checkout session: {e}");
                    Redirect::to("/checkout?error=payment_failed").into_response()
                }
            }
        }
        _ => Redirect::to("/checkout?error=payment_method").into_response(),
    }
}

/// Resolve the shipping address from a saved id or the typed-in fields.
async fn resolve_shipping(
    state: &AppState,
    token: &str,
    form: &CheckoutForm,
) -> Result<ShippingAddressInput, &'static str> {
    if let Some(address_id) = form.address_id.as_deref().filter(|id| !id.is_empty()) {
        let address_id = AddressId::new(address_id);
        let address = state
            .commerce()
            .get_address(token, &address_id)
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch saved address {address_id}: {e}");
                "address_missing"
            })?;
        return Ok(ShippingAddressInput {
            details: address.details,
            phone: address.phone,
            city: address.city,
        });
    }

    let details = form.details.as_deref().unwrap_or("").trim().to_string();
    let phone = form.phone.as_deref().unwrap_or("").trim().to_string();
    let city = form.city.as_deref().unwrap_or("").trim().to_string();

    if details.is_empty() || city.is_empty() {
        return Err("missing_fields");
    }
    if Phone::parse(&phone).is_err() {
        return Err("invalid_phone");
    }

    Ok(ShippingAddressInput {
        details,
        phone,
        city,
    })
}
