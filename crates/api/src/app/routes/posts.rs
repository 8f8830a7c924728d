use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};

use postboard_core::{NewPost, PostId, PostPatch, post::validate_title};
use postboard_events::ChangeEvent;

use crate::app::dto::{CreatePostRequest, UpdatePostRequest};
use crate::app::errors::{self, ApiResult};
use crate::app::services::AppServices;
use crate::authz::ensure_owner;
use crate::context::IdentityContext;

pub async fn list_posts(Extension(services): Extension<Arc<AppServices>>) -> ApiResult {
    let posts = services
        .posts
        .list_posts()
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(Json(posts).into_response())
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: PostId = id.parse().map_err(errors::domain_error_to_response)?;
    let post = services
        .posts
        .find_post(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::not_found("post"))?;
    Ok(Json(post).into_response())
}

/// Only the named author (or an admin) may create a post for that author.
/// An unknown author is a 404 for everyone.
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<CreatePostRequest>,
) -> ApiResult {
    let author = services
        .accounts
        .find_account_by_id(body.author_id)
        .await
        .map_err(errors::store_error_to_response)?;
    ensure_owner(&identity, author.map(|a| a.id))?;

    let title = body.title.trim().to_string();
    validate_title(&title).map_err(errors::domain_error_to_response)?;

    let post = services
        .posts
        .create_post(NewPost {
            title,
            content: body.content,
            author_id: body.author_id,
        })
        .await
        .map_err(errors::store_error_to_response)?;

    services.emit(ChangeEvent::PostCreated { post: post.clone() });
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> ApiResult {
    let id: PostId = id.parse().map_err(errors::domain_error_to_response)?;

    let owner = services
        .posts
        .find_post_owner(id)
        .await
        .map_err(errors::store_error_to_response)?;
    ensure_owner(&identity, owner)?;

    let mut patch = PostPatch::from(body);
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
        validate_title(title).map_err(errors::domain_error_to_response)?;
    }

    let post = services
        .posts
        .update_post(id, patch)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::not_found("post"))?;

    services.emit(ChangeEvent::PostUpdated { post: post.clone() });
    Ok(Json(post).into_response())
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Path(id): Path<String>,
) -> ApiResult {
    let id: PostId = id.parse().map_err(errors::domain_error_to_response)?;

    let owner = services
        .posts
        .find_post_owner(id)
        .await
        .map_err(errors::store_error_to_response)?;
    ensure_owner(&identity, owner)?;

    let existed = services
        .posts
        .delete_post(id)
        .await
        .map_err(errors::store_error_to_response)?;
    if !existed {
        return Err(errors::not_found("post"));
    }

    services.emit(ChangeEvent::PostDeleted { post_id: id });
    Ok(StatusCode::NO_CONTENT.into_response())
}
