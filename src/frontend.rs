//! Status page server.
//!
//! Each `GET /` mounts a fresh [`StatusPanel`], waits for its single health
//! fetch to settle and renders the result as HTML.

use std::sync::Arc;

use axum::{extract::State, middleware, response::Html, routing::get, Router};
use tera::Tera;
use tracing::instrument;

use crate::client::{StatusClient, StatusPanel};
use crate::error::AppError;
use crate::middleware::request_id_layer;
use crate::templates::render_status_page;

#[derive(Clone)]
pub struct FrontendState {
    pub client: StatusClient,
    pub tera: Arc<Tera>,
}

impl FrontendState {
    pub fn new(client: StatusClient, tera: Tera) -> Self {
        Self {
            client,
            tera: Arc::new(tera),
        }
    }
}

#[instrument(name = "frontend::index", skip(state))]
async fn index(State(state): State<FrontendState>) -> Result<Html<String>, AppError> {
    let mut panel = StatusPanel::new();
    panel.mount(state.client.clone());
    let view = panel.settled().await;

    let html = render_status_page(&state.tera, &view)?;
    Ok(Html(html))
}

pub fn create_frontend_router(state: FrontendState) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(state)
        .layer(middleware::from_fn(request_id_layer))
}
