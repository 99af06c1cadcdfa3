use std::convert::Infallible;

use serde_json::{json, Value};
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{InvalidQuery, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType},
    reply::Response,
    Rejection, Reply,
};

use crate::error::ApiError;

fn error_response(status: StatusCode, body: &Value) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

/// Turns every rejection into a JSON body with a matching status code.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, body) = if let Some(api_error) = err.find::<ApiError>() {
        if api_error.status().is_server_error() {
            log::error!("Request failed: {api_error}");
        } else {
            log::debug!("Request rejected: {api_error}");
        }
        (api_error.status(), api_error.body())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        log::warn!("Malformed request body: {e}");
        (
            StatusCode::BAD_REQUEST,
            json!({ "non_field_errors": [format!("Malformed request body: {e}")] }),
        )
    } else if let Some(e) = err.find::<InvalidQuery>() {
        log::warn!("Malformed query string: {e}");
        (
            StatusCode::BAD_REQUEST,
            json!({ "non_field_errors": ["Malformed query string."] }),
        )
    } else if err.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "detail": "Request body is too large." }),
        )
    } else if err.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            json!({ "detail": "Expected a JSON body." }),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "detail": "Method not allowed." }),
        )
    } else {
        log::error!("Unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "Internal server error" }),
        )
    };

    Ok(error_response(status, &body))
}
