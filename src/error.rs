use serde_json::{json, Value};
use thiserror::Error;
use warp::{http::StatusCode, reject::Reject};

use crate::database::error::{FieldErrors, QueryError, QueryErrorKind, TypeError};

/// Errors surfaced to API callers. Every variant maps to one status code and a JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed ({0})")]
    Validation(FieldErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("{0}")]
    Unauthorized(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found() -> Self {
        Self::NotFound(String::from("Not found."))
    }

    pub fn credentials_missing() -> Self {
        Self::Unauthorized(String::from(
            "Authentication credentials were not provided.",
        ))
    }

    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::Conflict(message) | ApiError::BadRequest(message) => {
                json!({ "errors": message })
            }
            ApiError::NotFound(message) | ApiError::Unauthorized(message) => {
                json!({ "detail": message })
            }
            ApiError::Forbidden => json!({ "detail": self.to_string() }),
            // details stay in the log
            ApiError::Internal(_) => json!({ "detail": "Internal server error" }),
        }
    }
}

impl Reject for ApiError {}

impl From<QueryError> for ApiError {
    fn from(value: QueryError) -> Self {
        match value.kind() {
            QueryErrorKind::NotFound => ApiError::not_found(),
            QueryErrorKind::UniqueViolation => {
                ApiError::Conflict(String::from("Object already exists"))
            }
            QueryErrorKind::ForeignKeyViolation => {
                ApiError::NotFound(String::from("Referenced object does not exist"))
            }
            QueryErrorKind::CheckViolation => ApiError::invalid_field(
                "non_field_errors",
                value.constraint().unwrap_or(value.info()),
            ),
            QueryErrorKind::Other => {
                log::error!("Storage failure: {value}");
                ApiError::Internal(value.info().to_string())
            }
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(value: FieldErrors) -> Self {
        ApiError::Validation(value)
    }
}

impl From<TypeError> for ApiError {
    fn from(value: TypeError) -> Self {
        ApiError::Validation(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(ApiError::invalid_field("name", "blank").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::credentials_missing().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Internal(String::from("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let error: ApiError =
            QueryError::constraint_violation(QueryErrorKind::UniqueViolation, "carts_unique").into();
        assert!(matches!(error, ApiError::Conflict(_)));
    }

    #[test]
    fn internal_body_hides_details() {
        let error = ApiError::Internal(String::from("connection refused on 10.0.0.3"));
        assert_eq!(error.body(), json!({"detail": "Internal server error"}));
    }
}
