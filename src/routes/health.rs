//! Health check endpoint.
//!
//! Always answers 200 with a JSON body. Database reachability is reported in
//! the `database` field, so callers can parse the response even when the
//! dependency is down.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::instrument;

use crate::model::HealthStatus;
use crate::state::AppState;

/// Health check handler.
///
/// Runs the probe query once; a failure is logged and embedded as
/// `database: "error: <message>"`.
#[instrument(name = "health::health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let health = match state.db.probe().await {
        Ok(()) => HealthStatus::connected(Utc::now()),
        Err(e) => {
            tracing::error!(error = %e, "Database connection error");
            HealthStatus::database_error(Utc::now(), &e.to_string())
        }
    };
    Json(health)
}
