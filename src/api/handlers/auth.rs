use crate::{
    api::{state::AppState, views::TokenView},
    authentication::{
        cryptography::verify_password,
        jwt::{generate_jwt_session, SessionData},
    },
    database::{form::LoginForm, repository::UserRepository},
    error::ApiError,
};

fn bad_credentials() -> ApiError {
    ApiError::invalid_field(
        "non_field_errors",
        "Unable to log in with provided credentials.",
    )
}

pub async fn login(state: &AppState, form: LoginForm) -> Result<TokenView, ApiError> {
    let email = form.email.trim().to_lowercase();
    let user = state
        .store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(bad_credentials)?;

    let valid = verify_password(&form.password, &user.password).map_err(|e| {
        log::error!("Stored password hash for user {} is unreadable: {e}", user.id);
        ApiError::Internal(e.to_string())
    })?;
    if !valid {
        log::warn!("Failed login for user {}", user.id);
        return Err(bad_credentials());
    }

    Ok(TokenView {
        auth_token: generate_jwt_session(&user, &state.settings)?,
    })
}

/// Tokens are stateless, so logging out only checks that the caller was logged in.
pub async fn logout(session: Option<SessionData>) -> Result<(), ApiError> {
    let session = SessionData::require(session)?;
    log::info!("User {} logged out", session.user_id);
    Ok(())
}
