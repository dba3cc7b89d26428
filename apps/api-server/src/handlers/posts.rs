//! Post handlers.
//!
//! Routes addressing a post by id do not compare the caller with the
//! post's owner: any authenticated caller may update or delete any post.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde_json::Value;

use devbook_core::domain::{FieldMap, NewPost, PostField};
use devbook_core::error::DomainError;
use devbook_shared::dto::{CreatePostRequest, PostCreatedResponse, PostResponse};

use super::{list_query, parse_id};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_post = NewPost {
        user_id: identity.user_id,
        title: req.title,
        content: req.content,
    };
    state.validator.new_post(&new_post)?;

    let post_id = state.posts.create(new_post).await?;
    tracing::info!(post_id = %post_id, user_id = %identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(PostCreatedResponse {
        message: "Post created successfully".to_string(),
        post_id,
    }))
}

/// GET /api/posts, GET /api/posts-by-user
///
/// Lists the caller's own posts only.
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<HashMap<String, String>>,
) -> AppResult<HttpResponse> {
    let (page, filters) = list_query::<PostField>(&query)?;

    let posts = state
        .posts
        .find_many_by_user_id(identity.user_id, page, &filters)
        .await?;
    let body: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "Post",
            id,
        })?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let changes = FieldMap::<PostField>::changes(&body)?;
    state.validator.post_changes(&changes)?;

    tracing::debug!(caller = %identity.user_id, post_id = %id, "Updating post");
    let post = state.posts.update(id, changes).await?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    tracing::info!(caller = %identity.user_id, post_id = %id, "Deleting post");
    state.posts.delete(id).await?;

    Ok(HttpResponse::NoContent().finish())
}
