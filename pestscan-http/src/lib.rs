use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pestscan_store::{RecordStore, StoreError};
use pestscan_types::{Agrovet, Crop, Farm, NewCrop, NewFarm, Pest};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;

pub mod config;
pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

/// Failures surfaced to API clients as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/pests", get(list_pests))
        .route("/api/agrovets", get(list_agrovets))
        .route("/api/farms", get(list_farms).post(create_farm))
        .route("/api/farms/:id/crops", get(list_crops).post(create_crop))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_pests(State(state): State<AppState>) -> Result<Json<Vec<Pest>>, ApiError> {
    Ok(Json(state.store.pests().await?))
}

async fn list_agrovets(State(state): State<AppState>) -> Result<Json<Vec<Agrovet>>, ApiError> {
    Ok(Json(state.store.agrovets().await?))
}

async fn list_farms(State(state): State<AppState>) -> Result<Json<Vec<Farm>>, ApiError> {
    Ok(Json(state.store.farms().await?))
}

async fn create_farm(State(state): State<AppState>, body: Bytes) -> Result<Json<Farm>, ApiError> {
    let farm: NewFarm = decode_body(&body)?;
    farm.geometry()
        .map_err(|e| ApiError::BadRequest(format!("boundaries: {e}")))?;
    Ok(Json(state.store.create_farm(farm).await?))
}

async fn list_crops(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Crop>>, ApiError> {
    let farm_id = parse_farm_id(&id)?;
    Ok(Json(state.store.crops_by_farm_id(farm_id).await?))
}

async fn create_crop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Crop>, ApiError> {
    let farm_id = parse_farm_id(&id)?;
    let crop: NewCrop = decode_body(&body)?;
    Ok(Json(state.store.create_crop(farm_id, crop).await?))
}

// Decoded by hand so missing or mistyped fields come back as 400 {message}
// rather than axum's plain-text 422.
fn decode_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn parse_farm_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid farm id: {raw}")))
}
