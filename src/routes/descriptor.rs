//! `GET /api`: static description of the API.

use axum::Json;

use crate::model::ApiDescriptor;

pub async fn descriptor() -> Json<ApiDescriptor> {
    Json(ApiDescriptor::current())
}
