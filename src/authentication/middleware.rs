use std::sync::Arc;

use warp::{
    reject::{self, Rejection},
    Filter,
};

use super::jwt::{verify_jwt_session, SessionData};
use crate::{config::Settings, error::ApiError};

/// Extracts the token from `Token <jwt>` or `Bearer <jwt>`.
pub fn parse_authorization(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    if (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")) && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// No `Authorization` header means an anonymous caller. A header that does not carry a
/// valid token rejects the request with 401.
pub fn with_possible_session(
    settings: Arc<Settings>,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let settings = settings.clone();
        async move {
            let header = match header {
                Some(header) => header,
                None => return Ok(None),
            };

            let token = match parse_authorization(&header) {
                Some(token) => token,
                None => {
                    return Err(reject::custom(ApiError::Unauthorized(String::from(
                        "Invalid authorization header.",
                    ))))
                }
            };

            match verify_jwt_session(token, &settings) {
                Ok(data) => Ok(Some(SessionData::from(data))),
                Err(e) => {
                    log::warn!("Rejected session: {e}");
                    Err(reject::custom(e))
                }
            }
        }
    })
}
