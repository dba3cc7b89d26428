//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use devbook_core::validation::DEFAULT_MIN_PASSWORD_LENGTH;
use devbook_infra::auth::JwtConfig;
use devbook_infra::database::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Longest accepted token lifetime (one year).
const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub min_password_length: usize,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = Self::database_url(&var).map(|url| DatabaseConfig {
            url,
            max_connections: parse(var("DB_MAX_CONNECTIONS")).unwrap_or(20),
            min_connections: parse(var("DB_MIN_CONNECTIONS")).unwrap_or(2),
        });

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: var("API_SECRET").or_else(|| var("JWT_SECRET")),
            expiration_hours: parse::<i64>(var("JWT_EXPIRATION_HOURS"))
                .filter(|hours| (1..=MAX_JWT_EXPIRATION_HOURS).contains(hours))
                .unwrap_or(jwt_defaults.expiration_hours),
            issuer: var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(var("PORT")).unwrap_or(8080),
            database,
            jwt,
            min_password_length: parse(var("PASSWORD_MIN_LENGTH")).unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH),
            telemetry: TelemetryConfig {
                json_logs: var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
                service_name: var("OTEL_SERVICE_NAME").unwrap_or_else(|| "devbook-api".to_string()),
            },
        }
    }

    /// `DATABASE_URL` wins; otherwise assemble one from the discrete parts
    /// when at least host and name are present.
    fn database_url(var: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(url) = var("DATABASE_URL") {
            return Some(url);
        }

        let host = var("DATABASE_HOST")?;
        let name = var("DATABASE_NAME")?;
        let port = parse(var("DATABASE_PORT")).unwrap_or(5432);
        let user = var("DATABASE_USER").unwrap_or_else(|| "postgres".to_string());
        let password = var("DATABASE_PASSWORD").unwrap_or_default();

        DatabaseConfig::from_parts(&host, port, &name, &user, &password).ok()
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
