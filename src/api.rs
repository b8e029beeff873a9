// src/api.rs - Read-only JSON API over the well database
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::{self, DbPool};
use crate::error::ApiError;
use crate::models::WellDetail;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// API routes, with everything else served from `static_dir`.
pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/wells", get(list_wells))
        .route("/api/wells/:api", get(get_well))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_wells(State(state): State<AppState>) -> Result<Json<Vec<WellDetail>>, ApiError> {
    let wells = db::list_wells_with_stimulations(&state.db).await?;
    info!("📋 Listing {} well(s)", wells.len());
    Ok(Json(wells))
}

async fn get_well(
    State(state): State<AppState>,
    Path(api): Path<String>,
) -> Result<Json<WellDetail>, ApiError> {
    match db::find_well_by_api(&state.db, &api).await? {
        Some(well) => Ok(Json(well)),
        None => Err(ApiError::NotFound(api)),
    }
}
