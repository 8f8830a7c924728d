use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use postboard_auth::IdentityClaims;

use crate::app::dto::{LoginRequest, TokenResponse};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;

/// Exchange credentials for a bearer token.
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult {
    let email = body.email.trim();
    let account = services
        .accounts
        .find_account_by_email(email)
        .await
        .map_err(errors::store_error_to_response)?;

    let Some(account) = account else {
        tracing::info!("login rejected");
        return Err(errors::invalid_credentials());
    };

    match services
        .verify_password(body.password, account.password_hash.clone())
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("login rejected");
            return Err(errors::invalid_credentials());
        }
        Err(e) => {
            tracing::warn!(account_id = %account.id, error = %e, "stored password hash unusable");
            return Err(errors::invalid_credentials());
        }
    }

    let identity = IdentityClaims::new(account.id, account.email, account.role);
    let access_token = services
        .tokens
        .issue(&identity)
        .map_err(errors::token_error_to_response)?;

    tracing::info!(account_id = %identity.id, "login succeeded");
    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token,
            token_type: "Bearer",
            expires_in: services.tokens.ttl().as_secs(),
        }),
    )
        .into_response())
}
