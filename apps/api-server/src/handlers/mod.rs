//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;

use std::collections::HashMap;

use actix_web::web;
use uuid::Uuid;

use devbook_core::domain::{Field, FieldMap, Pagination};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/login", web::post().to(auth::login))
            .route("/sign-in", web::post().to(auth::sign_in))
            // Accounts
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::create_user))
                    .route("", web::get().to(users::list_users))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user)),
            )
            // Posts
            .route("/posts-by-user", web::get().to(posts::list_posts))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}

/// Parse a path id; anything but a UUID is a bad request.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("`{raw}` is not a valid id")))
}

/// Split list query parameters into a page window and allow-listed filters.
fn list_query<F: Field>(
    params: &HashMap<String, String>,
) -> Result<(Pagination, FieldMap<F>), AppError> {
    let page = Pagination::from_params(
        params.get("limit").map(String::as_str),
        params.get("page").map(String::as_str),
    );
    let filters = FieldMap::filters(
        params
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "limit" | "page"))
            .map(|(key, value)| (key.as_str(), value.clone())),
    )?;

    Ok((page, filters))
}
