//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring customer authentication in route handlers.
//! "Authenticated" means the session holds a [`CurrentCustomer`] with a token
//! issued by the remote API's signin endpoint.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Extractor that requires customer authentication.
///
/// If the customer is not signed in, page requests are redirected to the
/// login page and HTMX fragment requests get a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireCustomer(customer): RequireCustomer,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.name)
/// }
/// ```
pub struct RequireCustomer(pub CurrentCustomer);

/// Error returned when authentication is required but the customer is not signed in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for fragment requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        // Get the current customer from the session
        let customer: CurrentCustomer = session
            .get(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // HTMX fragment requests carry an HX-Request header; a
                // redirect would swap the login page into the fragment slot.
                let is_fragment = parts.headers.contains_key("hx-request");
                if is_fragment {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireCustomer`, this does not reject the request if the customer
/// is not signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalCustomer(customer): OptionalCustomer,
/// ) -> impl IntoResponse {
///     match customer {
///         Some(c) => format!("Hello, {}!", c.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalCustomer(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Helper to set the current customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Helper to clear the current customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
