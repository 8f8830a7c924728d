use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::context::IdentityContext;

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(identity): Extension<IdentityContext>) -> impl IntoResponse {
    Json(identity.claims().clone())
}
