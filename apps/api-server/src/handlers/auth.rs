//! Authentication handlers.

use actix_web::{HttpResponse, web};

use devbook_core::domain::NewUser;
use devbook_core::error::{DomainError, RepoError};
use devbook_core::ports::AuthError;
use devbook_shared::dto::{LoginRequest, SignInRequest, TokenResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    state.validator.credentials(&req.email, &req.password)?;

    // Unknown email and wrong password answer identically.
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = state.passwords.verify(&req.password, &user.password_hash)?;
    if !valid {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue_token(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/sign-in
pub async fn sign_in(
    state: web::Data<AppState>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        password: req.password,
    };
    state.validator.require("name", &new_user.name)?;
    state.validator.new_user(&new_user)?;

    if state.users.find_by_email(&new_user.email).await?.is_some() {
        return Err(email_taken().into());
    }

    let user_id = state.users.create(new_user).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::from(email_taken()),
        other => AppError::from(other),
    })?;

    let token = state.tokens.issue_token(user_id)?;
    tracing::info!(user_id = %user_id, "User signed in");

    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

fn email_taken() -> DomainError {
    DomainError::Duplicate("Email already registered".to_string())
}
