//! Health check endpoint.

use std::time::Duration;

use actix_web::{HttpResponse, web};
use serde::Serialize;

use devbook_infra::database::DatabaseHealth;

use crate::state::AppState;

/// Deadline for the database ping.
const PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: DatabaseStatus,
}

#[derive(Serialize)]
pub struct DatabaseStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint - liveness plus a database probe.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.db {
        None => DatabaseStatus {
            status: "IN_MEMORY",
            version: None,
            version_error: None,
            error: None,
        },
        Some(db) => match db.probe(PING_TIMEOUT).await {
            DatabaseHealth::Up {
                version,
                version_error,
            } => DatabaseStatus {
                status: "UP",
                version,
                version_error,
                error: None,
            },
            DatabaseHealth::Down { reason } => {
                tracing::error!(error = %reason, "Database health check failed");
                DatabaseStatus {
                    status: "DOWN",
                    version: None,
                    version_error: None,
                    error: Some(reason),
                }
            }
        },
    };

    let healthy = database.status != "DOWN";
    let response = HealthResponse {
        status: if healthy { "UP" } else { "DOWN" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
