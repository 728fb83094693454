//! Stand listing.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::instrument;

use super::list_table;
use crate::db::Listing;
use crate::error::AppError;
use crate::state::AppState;

/// All stands, ascending by `stand_id`.
#[instrument(name = "stands::list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    list_table(&state, Listing::Stands).await
}
