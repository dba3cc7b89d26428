use std::time::Duration;

#[cfg(feature = "postgres")]
use tokio::time::Instant;
use url::Url;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr, Statement};

/// Configuration for the PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Build a connection URL from its discrete parts. Credentials are
    /// percent-encoded.
    pub fn from_parts(
        host: &str,
        port: u16,
        name: &str,
        user: &str,
        password: &str,
    ) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&format!("postgres://{host}:{port}"))?;
        url.set_path(name);
        url.set_username(user)
            .map_err(|()| url::ParseError::EmptyHost)?;
        url.set_password((!password.is_empty()).then_some(password))
            .map_err(|()| url::ParseError::EmptyHost)?;

        Ok(url.into())
    }
}

/// Outcome of a health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseHealth {
    Up {
        version: Option<String>,
        version_error: Option<String>,
    },
    Down { reason: String },
}

/// Shared database connection pool.
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: DbConn,
}

#[cfg(not(feature = "postgres"))]
pub struct DatabaseConnections;

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the pool. Fails when the server is unreachable.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection pool...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!(
            "Database connected (pool: {}..{})",
            config.min_connections,
            config.max_connections
        );

        Ok(Self { main })
    }

    /// Wrap an existing connection (mock connections in tests).
    pub fn from_connection(main: DbConn) -> Self {
        Self { main }
    }

    /// Ping, then ask the server for its version. Both steps share one
    /// deadline of `timeout`.
    pub async fn probe(&self, timeout: Duration) -> DatabaseHealth {
        let deadline = Instant::now() + timeout;

        if let Err(reason) = before(deadline, "ping", self.main.ping()).await {
            return DatabaseHealth::Down { reason };
        }

        // A failed version query does not make the database DOWN.
        let statement = Statement::from_string(
            self.main.get_database_backend(),
            "SELECT version() AS version",
        );
        let version = before(deadline, "version query", self.main.query_one(statement))
            .await
            .and_then(|row| row.ok_or_else(|| "version query returned no rows".to_string()))
            .and_then(|row| row.try_get::<String>("", "version").map_err(|e| e.to_string()));

        match version {
            Ok(version) => DatabaseHealth::Up {
                version: Some(version),
                version_error: None,
            },
            Err(error) => {
                tracing::warn!(error = %error, "Database version query failed");
                DatabaseHealth::Up {
                    version: None,
                    version_error: Some(error),
                }
            }
        }
    }
}

/// Run one probe step, failing it once `deadline` passes.
#[cfg(feature = "postgres")]
async fn before<T, E, F>(deadline: Instant, step: &str, future: F) -> Result<T, String>
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout_at(deadline, future).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!("{step} timed out")),
    }
}

#[cfg(not(feature = "postgres"))]
impl DatabaseConnections {
    pub async fn probe(&self, _timeout: Duration) -> DatabaseHealth {
        DatabaseHealth::Down {
            reason: "built without database support".to_string(),
        }
    }
}
