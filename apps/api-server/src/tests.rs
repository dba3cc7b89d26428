//! In-process HTTP scenarios over the in-memory repositories.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use devbook_core::Validator;
use devbook_core::domain::{FieldMap, Pagination};
use devbook_core::ports::{AuthError, PasswordService};
use devbook_infra::auth::{JwtConfig, JwtTokenService};

use crate::handlers::configure_routes;
use crate::state::AppState;

/// Fast stand-in for Argon2 in HTTP scenarios.
struct PrefixHasher;

impl PasswordService for PrefixHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

fn test_state() -> AppState {
    let tokens = JwtTokenService::new(JwtConfig {
        secret: Some("test-secret".to_string()),
        ..JwtConfig::default()
    });
    AppState::in_memory(Arc::new(tokens), Arc::new(PrefixHasher), Validator::default())
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// Register through /api/sign-in and return the issued token.
macro_rules! sign_in {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/sign-in")
            .set_json(json!({"name": "Tester", "email": $email, "password": "password1"}))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_rt::test]
async fn test_health_reports_in_memory_mode() {
    let app = init_app!(test_state());

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "UP");
    assert_eq!(body["database"]["status"], "IN_MEMORY");
}

#[actix_rt::test]
async fn test_sign_in_then_login() {
    let app = init_app!(test_state());
    sign_in!(app, "amy@example.com");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": "amy@example.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let app = init_app!(test_state());
    sign_in!(app, "amy@example.com");

    let wrong_password = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": "amy@example.com", "password": "not-the-password"}))
        .to_request();
    let resp = test::call_service(&app, wrong_password).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body: Value = test::read_body_json(resp).await;

    let unknown_email = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": "nobody@example.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, unknown_email).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let unknown_email_body: Value = test::read_body_json(resp).await;

    assert_eq!(wrong_password_body, unknown_email_body);
}

#[actix_rt::test]
async fn test_sign_in_duplicate_email_conflicts() {
    let app = init_app!(test_state());
    sign_in!(app, "a@x.com");

    let req = test::TestRequest::post()
        .uri("/api/sign-in")
        .set_json(json!({"name": "Again", "email": "a@x.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_sign_in_requires_name() {
    let app = init_app!(test_state());

    let req = test::TestRequest::post()
        .uri("/api/sign-in")
        .set_json(json!({"name": "", "email": "a@x.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_create_user_duplicate_is_rejected_without_second_row() {
    let state = test_state();
    let app = init_app!(state);

    let first = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({"email": "a@x.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, first).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["user_id"].as_str().is_some());

    let second = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({"email": "a@x.com", "password": "password1"}))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let all = state
        .users
        .find_many(Pagination::default(), &FieldMap::new())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_ne!(all[0].password_hash, "password1");
}

#[actix_rt::test]
async fn test_user_json_never_exposes_password_hash() {
    let app = init_app!(test_state());
    sign_in!(app, "amy@example.com");

    let req = test::TestRequest::get()
        .uri("/api/users?email=amy")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "amy@example.com");
    assert!(users[0].get("password_hash").is_none());
    assert!(users[0].get("password").is_none());
}

#[actix_rt::test]
async fn test_bad_ids_and_unknown_filters_are_bad_requests() {
    let app = init_app!(test_state());

    let req = test::TestRequest::get().uri("/api/users/42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/users?password=x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_protected_user_routes_require_token() {
    let app = init_app!(test_state());
    let id = uuid::Uuid::new_v4();

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{id}"))
        .set_json(json!({"name": "x"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{id}"))
        .insert_header((header::AUTHORIZATION, "Token abc"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_create_post_without_token_persists_nothing() {
    let app = init_app!(test_state());
    let token = sign_in!(app, "amy@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("not.a.token"))
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn test_posts_are_listed_for_their_owner_only() {
    let app = init_app!(test_state());
    let amy = sign_in!(app, "amy@example.com");
    let bob = sign_in!(app, "bob@example.com");

    for title in ["Rust tips", "Cooking"] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&amy))
            .set_json(json!({"title": title, "content": "body"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Post created successfully");
    }

    let req = test::TestRequest::get()
        .uri("/api/posts-by-user?title=RUST")
        .insert_header(bearer(&amy))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Rust tips");

    let req = test::TestRequest::get()
        .uri("/api/posts")
        .insert_header(bearer(&bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn test_post_mutation_by_id_has_no_ownership_check() {
    let app = init_app!(test_state());
    let owner = sign_in!(app, "owner@example.com");
    let other = sign_in!(app, "other@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&owner))
        .set_json(json!({"title": "Mine", "content": "body"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body["post_id"].as_str().unwrap().to_string();

    // Any authenticated caller may edit or delete a post by id.
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(bearer(&other))
        .set_json(json!({"title": "Edited by someone else"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Edited by someone else");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(bearer(&other))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_empty_and_unknown_updates_are_bad_requests() {
    let app = init_app!(test_state());
    let token = sign_in!(app, "amy@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "Title", "content": "body"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body["post_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(bearer(&token))
        .set_json(json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(bearer(&token))
        .set_json(json!({"user_id": "someone"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_update_and_delete_user() {
    let state = test_state();
    let app = init_app!(state);
    let token = sign_in!(app, "amy@example.com");
    let user = state
        .users
        .find_by_email("amy@example.com")
        .await
        .unwrap()
        .unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/users/{}", user.id))
        .insert_header(bearer(&token))
        .set_json(json!({"name": "Amelia", "password": "another-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Amelia");

    let stored = state.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, "hashed:another-password");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", user.id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user_id"], user.id.to_string());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", user.id))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
