//! Authentication extractor for protected routes.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use devbook_core::authorization::authorize;
use devbook_core::ports::AuthError;
use devbook_shared::ErrorResponse;

use crate::state::AppState;

/// Authenticated caller identity.
///
/// Adding this to a handler's arguments makes the route protected: the
/// handler body never runs without a valid bearer token.
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: uuid::Uuid,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        if self.0.is_rejection() {
            actix_web::http::StatusCode::UNAUTHORIZED
        } else {
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::MalformedHeader(_) => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::ClaimMissing => {
                ErrorResponse::new(401, "Invalid Token").with_detail(self.0.to_string())
            }
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(self.0.to_string()),
            AuthError::SigningError(_) | AuthError::HashingError(_) => {
                ErrorResponse::internal_error()
            }
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ))));
        };

        let header = match req.headers().get(header::AUTHORIZATION) {
            None => None,
            Some(value) => match value.to_str() {
                Ok(s) => Some(s),
                Err(_) => {
                    return ready(Err(AuthenticationError(AuthError::MalformedHeader(
                        "header is not valid ASCII".to_string(),
                    ))));
                }
            },
        };

        match authorize(header, state.tokens.as_ref()) {
            Ok(user_id) => ready(Ok(Identity { user_id })),
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Rejected unauthenticated request");
                ready(Err(AuthenticationError(e)))
            }
        }
    }
}
