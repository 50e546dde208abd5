//! Password authentication route handlers.
//!
//! Failed sign-ins and registrations re-render the form with the error;
//! successful ones store the user in the session and redirect home.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nexura_core::SignupForm;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user, set_flash};
use crate::models::Flash;
use crate::routes::Layout;
use crate::routes::catalog::{SectionLink, section_links};
use crate::routes::checkout::capitalize;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

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
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub error: Option<String>,
    pub email: String,
    pub federated_enabled: bool,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub sections: Vec<SectionLink>,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub federated_enabled: bool,
}

/// User-facing message for a failed sign-in or registration.
fn auth_error_message(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
        AuthError::UserAlreadyExists => "An account with this email already exists".to_owned(),
        AuthError::InvalidEmail(_) | AuthError::Validation(_) => capitalize(&error.to_string()),
        AuthError::UnverifiedEmail => "Your email address is not verified".to_owned(),
        AuthError::Repository(_) | AuthError::PasswordHash => {
            "Something went wrong, please try again".to_owned()
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in users go straight home.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        layout: Layout::load(&session, None).await,
        sections: section_links(None),
        error: None,
        email: String::new(),
        federated_enabled: state.federated().is_some(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            set_current_user(&session, &user).await?;
            set_flash(&session, Flash::success(format!("Welcome back, {}", user.name))).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Ok(LoginTemplate {
                layout: Layout::load(&session, None).await,
                sections: section_links(None),
                error: Some(auth_error_message(&e)),
                email: form.email,
                federated_enabled: state.federated().is_some(),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        layout: Layout::load(&session, None).await,
        sections: section_links(None),
        error: None,
        name: String::new(),
        email: String::new(),
        federated_enabled: state.federated().is_some(),
    }
    .into_response()
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let result = match SignupForm::validate(
        &form.name,
        &form.email,
        &form.password,
        &form.password_confirm,
    ) {
        Ok(signup) => AuthService::new(state.pool()).register(&signup).await,
        Err(e) => Err(AuthError::Validation(e)),
    };

    match result {
        Ok(user) => {
            set_current_user(&session, &user).await?;
            set_flash(&session, Flash::success("Your account has been created")).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => Ok(RegisterTemplate {
            layout: Layout::load(&session, None).await,
            sections: section_links(None),
            error: Some(auth_error_message(&e)),
            name: form.name,
            email: form.email,
            federated_enabled: state.federated().is_some(),
        }
        .into_response()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use nexura_core::ProfileError;

    use super::*;

    #[test]
    fn test_validation_messages_are_capitalized() {
        let message =
            auth_error_message(&AuthError::Validation(ProfileError::PasswordMismatch));
        assert_eq!(message, "Passwords don't match");
    }

    #[test]
    fn test_internal_errors_are_not_exposed() {
        let message = auth_error_message(&AuthError::PasswordHash);
        assert!(!message.to_lowercase().contains("hash"));
    }
}
