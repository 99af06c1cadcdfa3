use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::permissions::ActionType;
use crate::{
    config::Settings,
    database::schema::{Id, User},
    error::ApiError,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Id,
    pub username: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Id, username: String, lifetime_hours: i64) -> Result<Self, ApiError> {
        let now = Utc::now();
        let exp = Duration::try_hours(lifetime_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| ApiError::Internal(format!("Session lifetime of {lifetime_hours}h is out of range")))?;

        Ok(Self {
            user_id: id,
            username,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: Id,
    pub username: String,
}

impl SessionData {
    /// Turns an anonymous caller into `Unauthorized`.
    pub fn require(session: Option<SessionData>) -> Result<SessionData, ApiError> {
        session.ok_or_else(ApiError::credentials_missing)
    }

    pub fn authenticate(&self, action: ActionType) -> Result<(), ApiError> {
        if !action.authenticate(self) {
            log::warn!("User {} denied {action:?}", self.user_id);
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }

    pub fn ensure_author(&self, author_id: Id) -> Result<(), ApiError> {
        self.authenticate(ActionType::ManageRecipe { author_id })
    }
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            username: value.username,
        }
    }
}

fn signing_key(settings: &Settings) -> Result<Hmac<Sha256>, ApiError> {
    Hmac::new_from_slice(settings.jwt_secret.as_bytes())
        .map_err(|e| ApiError::Internal(format!("Invalid signing key: {e}")))
}

pub fn generate_jwt_session(user: &User, settings: &Settings) -> Result<String, ApiError> {
    let key = signing_key(settings)?;
    let claims = JwtSessionData::new(user.id, user.username.to_owned(), settings.jwt_lifetime_hours)?;

    claims
        .sign_with_key(&key)
        .map_err(|e| ApiError::Internal(format!("Could not sign session: {e}")))
}

pub fn verify_jwt_session(token: &str, settings: &Settings) -> Result<JwtSessionData, ApiError> {
    let key = signing_key(settings)?;

    let session: JwtSessionData = token
        .verify_with_key(&key)
        .map_err(|_| ApiError::Unauthorized(String::from("Invalid token.")))?;

    if session.exp < Utc::now().timestamp() {
        return Err(ApiError::Unauthorized(String::from("Token expired.")));
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            email: String::from("cook@example.com"),
            username: String::from("cook"),
            first_name: String::from("Ann"),
            last_name: String::from("Cook"),
            password: String::new(),
        }
    }

    #[test]
    fn token_round_trips_with_same_secret() {
        let settings = Settings::default();
        let token = generate_jwt_session(&user(), &settings).unwrap();

        let session = verify_jwt_session(&token, &settings).unwrap();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "cook");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = generate_jwt_session(&user(), &Settings::default()).unwrap();
        let other = Settings {
            jwt_secret: String::from("another-secret"),
            ..Settings::default()
        };

        assert!(matches!(
            verify_jwt_session(&token, &other),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let settings = Settings::default();
        let key = signing_key(&settings).unwrap();
        let claims = JwtSessionData::new(7, String::from("cook"), -1).unwrap();
        let token = claims.sign_with_key(&key).unwrap();

        assert!(matches!(
            verify_jwt_session(&token, &settings),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn out_of_range_lifetime_is_an_internal_error() {
        let settings = Settings {
            jwt_lifetime_hours: i64::MAX,
            ..Settings::default()
        };

        assert!(matches!(
            generate_jwt_session(&user(), &settings),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn anonymous_caller_is_unauthorized() {
        assert!(matches!(
            SessionData::require(None),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn only_author_may_manage_recipe() {
        let session = SessionData {
            user_id: 7,
            username: String::from("cook"),
        };

        assert!(session.ensure_author(7).is_ok());
        assert!(matches!(session.ensure_author(8), Err(ApiError::Forbidden)));
    }
}
