//! Authentication route handlers.
//!
//! Handles login, registration, and the password reset flow against the
//! remote API's customer auth endpoints. The remote API issues the token;
//! this module only stores it in the session and replays guest state once a
//! token is in hand.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greenbasket_core::{Email, Phone};

use crate::commerce::types::SignupInput;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, session_keys};
use crate::services::sync;
use crate::state::AppState;

/// Minimum password length accepted by the remote API.
const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub phone: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset code form data.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeForm {
    pub reset_code: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reset code entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_code.html")]
pub struct VerifyCodeTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
///
/// Signs in against the remote API, resolves the customer id from the issued
/// token, stores the identity in the session, and replays any guest cart and
/// wishlist state.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if Email::parse(form.email.trim()).is_err() {
        return Redirect::to("/auth/login?error=invalid_email").into_response();
    }

    let auth = match state
        .commerce()
        .sign_in(form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            return Redirect::to("/auth/login?error=credentials").into_response();
        }
    };

    // Resolve the customer id (needed for order history) from the token
    let decoded = match state.commerce().verify_token(&auth.token).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("Failed to verify freshly issued token: {e}");
            return Redirect::to("/auth/login?error=profile").into_response();
        }
    };

    let customer = CurrentCustomer::new(
        decoded.id,
        auth.profile.name,
        auth.profile.email,
        auth.token,
    );

    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }
    set_sentry_user(&customer.id, Some(&customer.email));

    // Replay whatever the visitor collected before signing in
    sync::merge_guest_state(state.commerce(), &session, customer.token()).await;

    Redirect::to("/account").into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate { error: query.error }
}

/// Handle registration form submission.
///
/// Validation mirrors the remote rules so obviously bad input never leaves
/// the building; the remote API remains the authority on the rest.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let name = form.name.trim();
    if name.len() < 3 {
        return Redirect::to("/auth/register?error=name_too_short").into_response();
    }
    if Email::parse(form.email.trim()).is_err() {
        return Redirect::to("/auth/register?error=invalid_email").into_response();
    }
    if Phone::parse(form.phone.trim()).is_err() {
        return Redirect::to("/auth/register?error=invalid_phone").into_response();
    }
    if form.password.len() < MIN_PASSWORD_LENGTH {
        return Redirect::to("/auth/register?error=password_too_short").into_response();
    }
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    let input = SignupInput {
        name: name.to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        re_password: form.password_confirm,
        phone: form.phone.trim().to_string(),
    };

    match state.commerce().sign_up(&input).await {
        Ok(_) => Redirect::to("/auth/login?success=registered").into_response(),
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            let error_msg = e.to_string();
            if error_msg.contains("exist") || error_msg.contains("already") {
                Redirect::to("/auth/register?error=email_taken").into_response()
            } else {
                Redirect::to("/auth/register?error=failed").into_response()
            }
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle forgot password form submission.
///
/// Requests a reset code by email. The outcome is reported as success either
/// way to prevent email enumeration.
#[instrument(skip(state, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let email = form.email.trim().to_string();
    if Email::parse(&email).is_err() {
        return Redirect::to("/auth/forgot-password?error=invalid_email").into_response();
    }

    // The reset flow needs the email again at the final step
    if let Err(e) = session
        .insert(session_keys::PENDING_RESET_EMAIL, &email)
        .await
    {
        tracing::error!("Failed to store pending reset email: {e}");
        return Redirect::to("/auth/forgot-password?error=session").into_response();
    }

    if let Err(e) = state.commerce().forgot_password(&email).await {
        tracing::warn!("Password recovery request failed: {e}");
        // Still show success to prevent email enumeration
    }

    Redirect::to("/auth/verify-code?success=code_sent").into_response()
}

/// Display the reset code entry page.
pub async fn verify_code_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    VerifyCodeTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle reset code form submission.
#[instrument(skip(state, form))]
pub async fn verify_code(State(state): State<AppState>, Form(form): Form<VerifyCodeForm>) -> Response {
    let code = form.reset_code.trim();
    if code.is_empty() {
        return Redirect::to("/auth/verify-code?error=missing_code").into_response();
    }

    match state.commerce().verify_reset_code(code).await {
        Ok(()) => Redirect::to("/auth/reset-password").into_response(),
        Err(e) => {
            tracing::warn!("Reset code verification failed: {e}");
            Redirect::to("/auth/verify-code?error=invalid_code").into_response()
        }
    }
}

/// Display the new password page.
pub async fn reset_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ResetPasswordTemplate { error: query.error }
}

/// Handle reset password form submission.
///
/// Sets the new password, signs the customer in with the fresh token, and
/// replays guest state like a normal login.
#[instrument(skip(state, session, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let Some(email) = session
        .get::<String>(session_keys::PENDING_RESET_EMAIL)
        .await
        .ok()
        .flatten()
    else {
        return Redirect::to("/auth/forgot-password?error=expired").into_response();
    };

    if form.password.len() < MIN_PASSWORD_LENGTH {
        return Redirect::to("/auth/reset-password?error=password_too_short").into_response();
    }
    if form.password != form.password_confirm {
        return Redirect::to("/auth/reset-password?error=password_mismatch").into_response();
    }

    let token = match state.commerce().reset_password(&email, &form.password).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Password reset failed: {e}");
            return Redirect::to("/auth/reset-password?error=reset_failed").into_response();
        }
    };

    let decoded = match state.commerce().verify_token(&token).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("Failed to verify token after reset: {e}");
            return Redirect::to("/auth/login?success=password_reset").into_response();
        }
    };

    let name = decoded
        .name
        .clone()
        .unwrap_or_else(|| email.split('@').next().unwrap_or("customer").to_string());
    let customer = CurrentCustomer::new(decoded.id, name, email, token);

    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!("Failed to set session after password reset: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }
    set_sentry_user(&customer.id, Some(&customer.email));

    if let Err(e) = session
        .remove::<String>(session_keys::PENDING_RESET_EMAIL)
        .await
    {
        tracing::warn!("Failed to clear pending reset email: {e}");
    }

    sync::merge_guest_state(state.commerce(), &session, customer.token()).await;

    Redirect::to("/account").into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the session entirely. The remote API has no token revocation
/// endpoint; dropping the token is all a client can do.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
