use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};

use postboard_core::{
    AccountId, AccountPatch, NewAccount, Role,
    account::{validate_email, validate_name, validate_password},
};
use postboard_events::ChangeEvent;

use crate::app::dto::{AccountWithPosts, CreateAccountRequest, UpdateAccountRequest};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz::ensure_owner;
use crate::context::IdentityContext;

/// Public registration. New accounts always get the USER role.
pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult {
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_string();
    validate_name(&name)
        .and_then(|_| validate_email(&email))
        .and_then(|_| validate_password(&body.password))
        .map_err(errors::domain_error_to_response)?;

    let password_hash = services
        .hash_password(body.password)
        .await
        .map_err(errors::password_error_to_response)?;

    let account = services
        .accounts
        .create_account(NewAccount {
            name,
            email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(errors::store_error_to_response)?;

    tracing::info!(account_id = %account.id, "account registered");
    Ok((StatusCode::CREATED, Json(account)).into_response())
}

pub async fn list_accounts(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let accounts = services
        .accounts
        .list_accounts()
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(Json(accounts).into_response())
}

/// The account itself (or an admin) may read it, posts included.
pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: AccountId = id.parse().map_err(errors::domain_error_to_response)?;

    let account = services
        .accounts
        .find_account_by_id(id)
        .await
        .map_err(errors::store_error_to_response)?;
    ensure_owner(&identity, account.as_ref().map(|a| a.id))?;
    let Some(account) = account else {
        return Err(errors::not_found("account"));
    };

    let posts = services
        .posts
        .list_posts_by_author(account.id)
        .await
        .map_err(errors::store_error_to_response)?;

    Ok(Json(AccountWithPosts { account, posts }).into_response())
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAccountRequest>,
) -> ApiResult {
    let id: AccountId = id.parse().map_err(errors::domain_error_to_response)?;

    let owner = services
        .accounts
        .find_account_by_id(id)
        .await
        .map_err(errors::store_error_to_response)?
        .map(|a| a.id);
    ensure_owner(&identity, owner)?;

    let name = body.name.map(|n| n.trim().to_string());
    let email = body.email.map(|e| e.trim().to_string());
    if let Some(name) = &name {
        validate_name(name).map_err(errors::domain_error_to_response)?;
    }
    if let Some(email) = &email {
        validate_email(email).map_err(errors::domain_error_to_response)?;
    }
    let password_hash = match body.password {
        Some(password) => {
            validate_password(&password).map_err(errors::domain_error_to_response)?;
            Some(
                services
                    .hash_password(password)
                    .await
                    .map_err(errors::password_error_to_response)?,
            )
        }
        None => None,
    };

    let patch = AccountPatch {
        name,
        email,
        password_hash,
    };
    let account = services
        .accounts
        .update_account(id, patch)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::not_found("account"))?;

    services.emit(ChangeEvent::AccountUpdated {
        account: account.clone(),
    });
    Ok(Json(account).into_response())
}

/// Admin only (enforced by the router gate). Removes the account's posts too.
pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: AccountId = id.parse().map_err(errors::domain_error_to_response)?;

    let existed = services
        .accounts
        .delete_account(id)
        .await
        .map_err(errors::store_error_to_response)?;
    if !existed {
        return Err(errors::not_found("account"));
    }

    tracing::info!(account_id = %id, deleted_by = %identity.account_id(), "account deleted");
    services.emit(ChangeEvent::AccountDeleted { account_id: id });
    Ok(StatusCode::NO_CONTENT.into_response())
}
