//! Per-handler ownership policy.
//!
//! The owner is looked up from storage on every call; nothing is taken from
//! the token except the caller's id and role.

use axum::response::Response;

use postboard_auth::check_ownership;
use postboard_core::AccountId;

use crate::app::errors::access_error_to_response;
use crate::context::IdentityContext;

/// 404 when `owner` is `None`, 403 when the caller is neither admin nor owner.
pub fn ensure_owner(identity: &IdentityContext, owner: Option<AccountId>) -> Result<(), Response> {
    check_ownership(identity.claims(), owner).map_err(|e| {
        tracing::debug!(
            account_id = %identity.account_id(),
            owner = ?owner,
            reason = %e,
            "ownership check failed"
        );
        access_error_to_response(e)
    })
}
