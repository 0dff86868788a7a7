//! Account route handlers.
//!
//! These routes require authentication. Order history and addresses live on
//! the remote API; a failed fetch renders the empty state rather than an
//! error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use greenbasket_core::{AddressId, Phone};

use crate::commerce::types::{Address, AddressInput, Order};
use crate::filters;
use crate::middleware::auth::RequireCustomer;
use crate::routes::is_htmx;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Customer display data for templates.
#[derive(Clone)]
pub struct CustomerView {
    pub name: String,
    pub email: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub number: String,
    pub placed_at: String,
    pub total: String,
    pub payment_method: String,
    pub status: String,
    pub item_count: usize,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let status = match (order.is_delivered, order.is_paid) {
            (true, _) => "Delivered",
            (false, true) => "Paid",
            (false, false) => "Processing",
        };
        Self {
            number: order
                .order_number
                .map_or_else(|| order.id.to_string(), |n| format!("#{n}")),
            placed_at: order
                .created_at
                .as_deref()
                .map(format_order_date)
                .unwrap_or_default(),
            total: order.total().to_string(),
            payment_method: order.payment_method_type.clone(),
            status: status.to_string(),
            item_count: order.cart_items.len(),
        }
    }
}

/// Address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub name: String,
    pub details: String,
    pub phone: String,
    pub city: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            name: address.name.clone(),
            details: address.details.clone(),
            phone: address.phone.clone(),
            city: address.city.clone(),
        }
    }
}

/// Render an ISO timestamp as a short human date.
fn format_order_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |dt| dt.format("%b %d, %Y").to_string(),
    )
}

// =============================================================================
// Form / Query Types
// =============================================================================

/// New address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub name: String,
    pub details: String,
    pub phone: String,
    pub city: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub customer: CustomerView,
    pub recent_orders: Vec<OrderView>,
    pub address_count: usize,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub success: Option<String>,
}

/// Address list page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub addresses: Vec<AddressView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// New address form page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub error: Option<String>,
}

/// Address list fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_items.html")]
pub struct AddressItemsTemplate {
    pub addresses: Vec<AddressView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Number of orders shown on the overview page.
const RECENT_ORDER_COUNT: usize = 5;

/// Display account overview page.
#[instrument(skip(state, customer))]
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> impl IntoResponse {
    let recent_orders = match state.commerce().get_orders(&customer.id).await {
        Ok(mut orders) => {
            orders.truncate(RECENT_ORDER_COUNT);
            orders.iter().map(OrderView::from).collect()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch orders for overview: {e}");
            Vec::new()
        }
    };

    let address_count = match state.commerce().get_addresses(customer.token()).await {
        Ok(addresses) => addresses.len(),
        Err(e) => {
            tracing::warn!("Failed to fetch addresses for overview: {e}");
            0
        }
    };

    AccountIndexTemplate {
        customer: CustomerView {
            name: customer.name.clone(),
            email: customer.email.clone(),
        },
        recent_orders,
        address_count,
    }
}

/// Display order history page.
#[instrument(skip(state, customer))]
pub async fn orders(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    // A failed fetch renders the empty order list
    let orders = match state.commerce().get_orders(&customer.id).await {
        Ok(orders) => orders.iter().map(OrderView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch order history: {e}");
            Vec::new()
        }
    };

    OrdersTemplate {
        orders,
        success: query.success,
    }
}

/// Display address list page.
#[instrument(skip(state, customer))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let addresses = match state.commerce().get_addresses(customer.token()).await {
        Ok(addresses) => addresses.iter().map(AddressView::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch addresses: {e}");
            Vec::new()
        }
    };

    AddressesTemplate {
        addresses,
        error: query.error,
        success: query.success,
    }
}

/// Display the new address form.
#[instrument(skip(_customer))]
pub async fn new_address(
    RequireCustomer(_customer): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    AddressFormTemplate { error: query.error }
}

/// Handle new address form submission.
#[instrument(skip(state, customer, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Form(form): Form<AddressForm>,
) -> Response {
    let name = form.name.trim();
    let details = form.details.trim();
    let city = form.city.trim();
    if name.is_empty() || details.is_empty() || city.is_empty() {
        return Redirect::to("/account/addresses/new?error=missing_fields").into_response();
    }
    if Phone::parse(form.phone.trim()).is_err() {
        return Redirect::to("/account/addresses/new?error=invalid_phone").into_response();
    }

    let input = AddressInput {
        name: name.to_string(),
        details: details.to_string(),
        phone: form.phone.trim().to_string(),
        city: city.to_string(),
    };

    match state.commerce().add_address(customer.token(), &input).await {
        Ok(_) => Redirect::to("/account/addresses?success=saved").into_response(),
        Err(e) => {
            tracing::error!("Failed to save address: {e}");
            Redirect::to("/account/addresses/new?error=failed").into_response()
        }
    }
}

/// Handle address deletion.
///
/// Returns the address list fragment for HTMX requests, or redirects for
/// plain form posts.
#[instrument(skip(state, customer, headers))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let address_id = AddressId::new(id);

    let addresses = match state
        .commerce()
        .remove_address(customer.token(), &address_id)
        .await
    {
        Ok(addresses) => addresses.iter().map(AddressView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to delete address {address_id}: {e}");
            // Fall back to re-reading the list so the view stays truthful
            match state.commerce().get_addresses(customer.token()).await {
                Ok(addresses) => addresses.iter().map(AddressView::from).collect(),
                Err(_) => Vec::new(),
            }
        }
    };

    if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "addresses-updated")]),
            AddressItemsTemplate { addresses },
        )
            .into_response()
    } else {
        Redirect::to("/account/addresses").into_response()
    }
}
