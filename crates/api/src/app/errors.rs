use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use postboard_auth::{AccessError, PasswordError, Rejection, TokenError};
use postboard_core::DomainError;
use postboard_infra::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Gate rejections. The message never says *why* a token was refused.
pub fn rejection_to_response(rejection: Rejection) -> axum::response::Response {
    match rejection {
        Rejection::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required"),
        Rejection::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        Rejection::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err.rejection() {
        Rejection::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        other => rejection_to_response(other),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::MissingReference(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        StoreError::Unavailable(msg) => {
            tracing::error!(error = %msg, "store unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn password_error_to_response(err: PasswordError) -> axum::response::Response {
    tracing::error!(error = %err, "password hashing failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    tracing::error!(error = %err, "token issuance failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
}

pub fn invalid_credentials() -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid credentials")
}

pub fn not_found(what: &'static str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

/// Handler result: both arms are ready-made responses.
pub type ApiResult = Result<axum::response::Response, axum::response::Response>;
