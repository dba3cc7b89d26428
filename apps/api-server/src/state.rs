//! Application state - shared across all handlers.

use std::sync::Arc;

use devbook_core::Validator;
use devbook_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use devbook_infra::auth::{Argon2PasswordService, JwtTokenService};
use devbook_infra::database::{
    DatabaseConnections, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub validator: Validator,
    /// `None` when running on the in-memory repositories.
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let validator = Validator::new(config.min_password_length);

        let db = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => Some(Arc::new(connections)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        let state = match db {
            Some(conn) => Self {
                users: Arc::new(PostgresUserRepository::new(
                    conn.main.clone(),
                    passwords.clone(),
                )),
                posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                tokens,
                passwords,
                validator,
                db: Some(conn),
            },
            None => Self::in_memory(tokens, passwords, validator),
        };

        tracing::info!(
            database = state.db.is_some(),
            "Application state initialized"
        );
        state
    }

    /// State backed by the in-memory repositories.
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        validator: Validator,
    ) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new(passwords.clone())),
            posts: Arc::new(InMemoryPostRepository::new()),
            tokens,
            passwords,
            validator,
            db: None,
        }
    }
}
