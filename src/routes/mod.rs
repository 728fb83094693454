//! HTTP route handlers for the JSON API.
//!
//! Every response carries `Cache-Control: no-store`. Only the configured
//! frontend origin may call the API cross-origin, with credentials.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod capacity;
pub mod descriptor;
pub mod health;
pub mod stands;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use http::header::CACHE_CONTROL;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CorsConfig, CACHE_CONTROL_API};
use crate::db::Listing;
use crate::error::{handle_panic, AppError};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Run one listing query, mapping failure per the verbose-errors setting.
async fn list_table(state: &AppState, listing: Listing) -> Result<Json<Vec<Value>>, AppError> {
    state
        .db
        .list(listing)
        .await
        .map(Json)
        .map_err(|e| AppError::query(e, state.config.errors.verbose))
}

/// Fallback for unmatched paths.
async fn not_found() -> AppError {
    AppError::NotFound
}

/// CORS policy allowing only the configured frontend origin.
///
/// An origin that is not a valid header value allows nothing.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = match HeaderValue::from_str(&config.frontend_url) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(
                origin = %config.frontend_url,
                error = %e,
                "Invalid frontend URL, cross-origin requests disabled"
            );
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Creates the Axum router with all API routes and layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/api", get(descriptor::descriptor))
        .route("/api/health", get(health::health))
        .route("/api/stands", get(stands::list))
        .route("/api/capacity", get(capacity::list))
        .fallback(not_found)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_API),
        ))
        // Last-resort boundary: panics become the generic 500
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
