//! Federated sign-in route handlers (OpenID Connect authorization code flow).
//!
//! - Login: store state and nonce in the session, redirect to the provider
//! - Callback: check state, exchange the code, check the nonce, fetch the
//!   identity, then sign in or link the account

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{set_current_user, set_flash};
use crate::models::{Flash, session_keys};
use crate::services::federated::id_token_nonce;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Query parameters from the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET.get(idx).copied().unwrap_or(b'a'))
        })
        .collect()
}

fn redirect_uri(state: &AppState) -> String {
    format!("{}/auth/federated/callback", state.config().base_url)
}

/// Send the shopper back to the login page with a message.
async fn fail(session: &Session, message: &str) -> Response {
    set_flash(session, Flash::error(message)).await;
    Redirect::to("/auth/login").into_response()
}

/// Start federated sign-in.
///
/// # Route
///
/// `GET /auth/federated/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let Some(client) = state.federated() else {
        return Err(AppError::NotFound("sign-in provider".to_owned()));
    };

    let oauth_state = generate_random_string(32);
    let nonce = generate_random_string(32);

    session.insert(session_keys::OIDC_STATE, &oauth_state).await?;
    session.insert(session_keys::OIDC_NONCE, &nonce).await?;

    let auth_url = client.authorization_url(&redirect_uri(&state), &oauth_state, &nonce);
    Ok(Redirect::to(&auth_url).into_response())
}

/// Handle the provider callback.
///
/// # Route
///
/// `GET /auth/federated/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let Some(client) = state.federated() else {
        return Err(AppError::NotFound("sign-in provider".to_owned()));
    };

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Federated sign-in error: {} - {}", error, description);
        return Ok(fail(&session, "Sign-in was cancelled").await);
    }

    let Some(code) = query.code else {
        tracing::warn!("Federated callback missing code");
        return Ok(fail(&session, "Sign-in failed, please try again").await);
    };

    // State and nonce are single use
    let stored_state = session.remove::<String>(session_keys::OIDC_STATE).await?;
    let stored_nonce = session.remove::<String>(session_keys::OIDC_NONCE).await?;

    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("Federated sign-in state mismatch");
        return Ok(fail(&session, "Sign-in expired, please try again").await);
    }

    let tokens = client.exchange_code(&code, &redirect_uri(&state)).await?;

    if let Some(id_token) = &tokens.id_token {
        if id_token_nonce(id_token) != stored_nonce {
            tracing::warn!("Federated sign-in nonce mismatch");
            return Ok(fail(&session, "Sign-in failed, please try again").await);
        }
    }

    let identity = client.userinfo(&tokens.access_token).await?;

    let user = match AuthService::new(state.pool())
        .federated_sign_in(client.issuer(), &identity)
        .await
    {
        Ok(user) => user,
        Err(e @ (AuthError::UnverifiedEmail | AuthError::InvalidEmail(_))) => {
            tracing::warn!("Federated sign-in refused: {}", e);
            return Ok(fail(&session, "Your email address is not verified").await);
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(&session, &user).await?;
    set_flash(&session, Flash::success(format!("Welcome, {}", user.name))).await;
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_is_alphanumeric() {
        let value = generate_random_string(32);
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(value, generate_random_string(32));
    }
}
