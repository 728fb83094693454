use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::db::DbError;
use crate::model::ErrorBody;

/// Body of the last-resort 500; never carries internal detail
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// Listing failure message when verbose errors are disabled
pub const GENERIC_QUERY_ERROR: &str = "Database query failed";

pub const NOT_FOUND_MESSAGE: &str = "Not found";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A listing query failed; `message` is what the client sees
    #[error("{message}")]
    Query {
        message: String,
        #[source]
        source: DbError,
    },

    #[error("Route not found")]
    NotFound,

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    /// Wrap a listing failure, exposing the driver message only when `verbose`.
    pub fn query(source: DbError, verbose: bool) -> Self {
        let message = if verbose {
            source.to_string()
        } else {
            GENERIC_QUERY_ERROR.to_string()
        };
        AppError::Query { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Query { message, source } => {
                tracing::error!(error = %source, "Listing query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
            AppError::Template(e) => {
                tracing::error!("Template rendering failed: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Convert a handler panic into the generic 500.
///
/// Installed through `CatchPanicLayer::custom`; the payload is logged and
/// never returned to the client.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(
        panic = %detail,
        backtrace = %std::backtrace::Backtrace::force_capture(),
        "Request handler panicked"
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: GENERIC_ERROR_MESSAGE.to_string(),
        }),
    )
        .into_response()
}
