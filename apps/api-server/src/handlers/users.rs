//! Account handlers.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use serde_json::Value;

use devbook_core::domain::{FieldMap, NewUser, UserField};
use devbook_core::error::{DomainError, RepoError};
use devbook_shared::dto::{CreateUserRequest, UserIdResponse, UserResponse};

use super::{list_query, parse_id};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        password: req.password,
    };
    state.validator.new_user(&new_user)?;

    // This route reports an existing email as a bad request, not a conflict.
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user_id = state.users.create(new_user).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::BadRequest("Email already registered".to_string()),
        other => other.into(),
    })?;

    Ok(HttpResponse::Created().json(UserIdResponse { user_id }))
}

/// GET /api/users
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> AppResult<HttpResponse> {
    let (page, filters) = list_query::<UserField>(&query)?;

    let users = state.users.find_many(page, &filters).await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "User",
            id,
        })?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PUT /api/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let changes = FieldMap::<UserField>::changes(&body)?;
    state.validator.user_changes(&changes)?;

    tracing::debug!(caller = %identity.user_id, user_id = %id, "Updating user");
    let user = state.users.update(id, changes).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;

    tracing::info!(caller = %identity.user_id, user_id = %id, "Deleting user");
    let user_id = state.users.delete(id).await?;

    Ok(HttpResponse::Ok().json(UserIdResponse { user_id }))
}
