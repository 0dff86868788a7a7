//! Wishlist route handlers.
//!
//! Same dual-mode behavior as the cart: the remote wishlist API for signed-in
//! customers, the session-held guest wishlist otherwise.

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

use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalCustomer;
use crate::models::CurrentCustomer;
use crate::models::guest;
use crate::routes::is_htmx;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub items: Vec<ProductCardView>,
    pub signed_in: bool,
}

/// Wishlist items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_items.html")]
pub struct WishlistItemsTemplate {
    pub items: Vec<ProductCardView>,
}

/// Wishlist toggle button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: String,
    pub in_wishlist: bool,
}

// =============================================================================
// Form Types
// =============================================================================

/// Toggle/remove form data.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
}

// =============================================================================
// View Assembly
// =============================================================================

/// Build the current wishlist view for either mode.
async fn current_wishlist_view(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Vec<ProductCardView> {
    match customer {
        Some(customer) => match state.commerce().get_wishlist(customer.token()).await {
            Ok(products) => products.iter().map(ProductCardView::from).collect(),
            Err(e) => {
                tracing::warn!("Failed to fetch remote wishlist: {e}");
                Vec::new()
            }
        },
        None => {
            let wishlist = guest::load_wishlist(session).await;
            let mut items = Vec::with_capacity(wishlist.len());
            for product_id in wishlist.ids() {
                match state.commerce().get_product(product_id).await {
                    Ok(product) => items.push(ProductCardView::from(&product)),
                    Err(e) => {
                        tracing::warn!(product_id = %product_id, "Failed to hydrate wishlist entry: {e}");
                    }
                }
            }
            items
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display wishlist page.
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
) -> impl IntoResponse {
    let items = current_wishlist_view(&state, &session, customer.as_ref()).await;

    WishlistShowTemplate {
        items,
        signed_in: customer.is_some(),
    }
}

/// Toggle a product's wishlist membership.
///
/// Returns the toggle button fragment reflecting the new state, or redirects
/// for plain form posts.
#[instrument(skip(state, session, customer, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Result<Response, AppError> {
    let product_id = ProductId::new(form.product_id);
    if !product_id.is_well_formed() {
        return Err(AppError::BadRequest("Unknown product".to_string()));
    }

    let in_wishlist = match &customer {
        Some(customer) => {
            let token = customer.token();
            // The remote API has no toggle; membership decides the direction.
            let products = state.commerce().get_wishlist(token).await?;
            let present = products.iter().any(|p| p.id == product_id);
            if present {
                state
                    .commerce()
                    .remove_from_wishlist(token, &product_id)
                    .await?;
            } else {
                state.commerce().add_to_wishlist(token, &product_id).await?;
            }
            !present
        }
        None => {
            let mut wishlist = guest::load_wishlist(&session).await;
            let now_present = wishlist.toggle(&product_id);
            guest::store_wishlist(&session, &wishlist).await?;
            now_present
        }
    };

    let response = if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "wishlist-updated")]),
            WishlistButtonTemplate {
                product_id: product_id.to_string(),
                in_wishlist,
            },
        )
            .into_response()
    } else {
        Redirect::to("/wishlist").into_response()
    };
    Ok(response)
}

/// Remove a product from the wishlist.
///
/// Returns the wishlist items fragment, or redirects for plain form posts.
#[instrument(skip(state, session, customer, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalCustomer(customer): OptionalCustomer,
    headers: HeaderMap,
    Form(form): Form<WishlistForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    match &customer {
        Some(customer) => {
            if let Err(e) = state
                .commerce()
                .remove_from_wishlist(customer.token(), &product_id)
                .await
            {
                tracing::error!("Failed to remove from remote wishlist: {e}");
            }
        }
        None => {
            let mut wishlist = guest::load_wishlist(&session).await;
            wishlist.remove(&product_id);
            if let Err(e) = guest::store_wishlist(&session, &wishlist).await {
                tracing::error!("Failed to save guest wishlist to session: {e}");
            }
        }
    }

    let items = current_wishlist_view(&state, &session, customer.as_ref()).await;
    if is_htmx(&headers) {
        (
            AppendHeaders([("HX-Trigger", "wishlist-updated")]),
            WishlistItemsTemplate { items },
        )
            .into_response()
    } else {
        Redirect::to("/wishlist").into_response()
    }
}
