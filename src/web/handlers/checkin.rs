//! Anonymous patron-facing handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::checkin::DiningCheckInReceipt;
use crate::db::{GamingPatron, Venue};
use crate::web::dto::{ApiResponse, DiningCheckInRequest, GamingCheckInRequest, ValidatedJson};
use crate::web::error::ApiError;

use super::AppState;

/// GET /api/public/venues/:venue_id
pub async fn venue_by_id(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
) -> Result<Json<ApiResponse<Venue>>, ApiError> {
    let venue = state.checkin.get_venue(&venue_id).await?;
    Ok(Json(ApiResponse::new(venue)))
}

/// GET /api/public/by-url/:url_name
pub async fn venue_by_url(
    State(state): State<Arc<AppState>>,
    Path(url_name): Path<String>,
) -> Result<Json<ApiResponse<Venue>>, ApiError> {
    let venue = state.checkin.get_venue_by_url(&url_name).await?;
    Ok(Json(ApiResponse::new(venue)))
}

/// POST /api/public/venues/:venue_id/areas/:area_id/gaming-check-in
pub async fn gaming_check_in(
    State(state): State<Arc<AppState>>,
    Path((venue_id, area_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<GamingCheckInRequest>,
) -> Result<Json<ApiResponse<GamingPatron>>, ApiError> {
    let patron = state
        .checkin
        .submit_gaming_check_in(&venue_id, &area_id, req.into())
        .await?;
    Ok(Json(ApiResponse::new(patron)))
}

/// POST /api/public/venues/:venue_id/areas/:area_id/dining-check-in
pub async fn dining_check_in(
    State(state): State<Arc<AppState>>,
    Path((venue_id, area_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<DiningCheckInRequest>,
) -> Result<Json<ApiResponse<DiningCheckInReceipt>>, ApiError> {
    let receipt = state
        .checkin
        .submit_dining_check_in(&venue_id, &area_id, req.into())
        .await?;
    Ok(Json(ApiResponse::new(receipt)))
}
