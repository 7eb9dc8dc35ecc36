//! Service lifecycle handlers.
//!
//! All routes here require a FULL session; venue and service access is checked
//! by the lifecycle service itself.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::{DiningPatronUpdate, GamingPatronUpdate, Service};
use crate::web::dto::{
    ApiResponse, MoveTableRequest, UpdateDiningPatronRequest, UpdateGamingPatronRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::FullManager;

use super::AppState;

type Ack = Result<Json<ApiResponse<()>>, ApiError>;

fn ack() -> Ack {
    Ok(Json(ApiResponse::new(())))
}

/// POST /api/venues/:venue_id/areas/:area_id/dining-service
pub async fn start_dining(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((venue_id, area_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let service = state
        .lifecycle
        .start_dining_service(&principal.manager_id, &venue_id, &area_id)
        .await?;
    Ok(Json(ApiResponse::new(service)))
}

/// DELETE /api/venues/:venue_id/areas/:area_id/dining-service
pub async fn stop_dining(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((venue_id, area_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let service = state
        .lifecycle
        .stop_dining_service(&principal.manager_id, &venue_id, &area_id)
        .await?;
    Ok(Json(ApiResponse::new(service)))
}

/// POST /api/venues/:venue_id/areas/:area_id/gaming-service
pub async fn start_gaming(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((venue_id, area_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let service = state
        .lifecycle
        .start_gaming_service(&principal.manager_id, &venue_id, &area_id)
        .await?;
    Ok(Json(ApiResponse::new(service)))
}

/// DELETE /api/venues/:venue_id/areas/:area_id/gaming-service
pub async fn stop_gaming(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((venue_id, area_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let service = state
        .lifecycle
        .stop_gaming_service(&principal.manager_id, &venue_id, &area_id)
        .await?;
    Ok(Json(ApiResponse::new(service)))
}

/// GET /api/services/:service_id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path(service_id): Path<String>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let service = state
        .lifecycle
        .get_service(&principal.manager_id, &service_id)
        .await?;
    Ok(Json(ApiResponse::new(service)))
}

/// POST /api/services/:service_id/tables/:table_id/move
pub async fn move_table(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, table_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<MoveTableRequest>,
) -> Ack {
    state
        .lifecycle
        .move_dining_table(
            &principal.manager_id,
            &service_id,
            &table_id,
            &req.new_table_number,
        )
        .await?;
    ack()
}

/// POST /api/services/:service_id/tables/:table_id/close
pub async fn close_table(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, table_id)): Path<(String, String)>,
) -> Ack {
    state
        .lifecycle
        .close_dining_table(&principal.manager_id, &service_id, &table_id)
        .await?;
    ack()
}

/// POST /api/services/:service_id/tables/:table_id/check-ins/:check_in_id/move
pub async fn move_group(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, table_id, check_in_id)): Path<(String, String, String)>,
    ValidatedJson(req): ValidatedJson<MoveTableRequest>,
) -> Ack {
    state
        .lifecycle
        .move_dining_group(
            &principal.manager_id,
            &service_id,
            &table_id,
            &check_in_id,
            &req.new_table_number,
        )
        .await?;
    ack()
}

/// PATCH /api/services/:service_id/tables/:table_id/check-ins/:check_in_id/patrons/:patron_id
pub async fn update_dining_patron(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, table_id, check_in_id, patron_id)): Path<(String, String, String, String)>,
    ValidatedJson(req): ValidatedJson<UpdateDiningPatronRequest>,
) -> Ack {
    let update = DiningPatronUpdate::from(req);
    state
        .lifecycle
        .update_dining_patron(
            &principal.manager_id,
            &service_id,
            &table_id,
            &check_in_id,
            &patron_id,
            &update,
        )
        .await?;
    ack()
}

/// DELETE /api/services/:service_id/tables/:table_id/check-ins/:check_in_id/patrons/:patron_id
pub async fn delete_dining_patron(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, table_id, check_in_id, patron_id)): Path<(String, String, String, String)>,
) -> Ack {
    state
        .lifecycle
        .delete_dining_patron(
            &principal.manager_id,
            &service_id,
            &table_id,
            &check_in_id,
            &patron_id,
        )
        .await?;
    ack()
}

/// PATCH /api/services/:service_id/patrons/:patron_id
pub async fn update_gaming_patron(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, patron_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<UpdateGamingPatronRequest>,
) -> Ack {
    let update = GamingPatronUpdate::from(req);
    state
        .lifecycle
        .update_gaming_patron(&principal.manager_id, &service_id, &patron_id, &update)
        .await?;
    ack()
}

/// DELETE /api/services/:service_id/patrons/:patron_id
pub async fn delete_gaming_patron(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, patron_id)): Path<(String, String)>,
) -> Ack {
    state
        .lifecycle
        .delete_gaming_patron(&principal.manager_id, &service_id, &patron_id)
        .await?;
    ack()
}

/// POST /api/services/:service_id/patrons/:patron_id/check-out
pub async fn check_out_gaming_patron(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
    Path((service_id, patron_id)): Path<(String, String)>,
) -> Ack {
    state
        .lifecycle
        .check_out_gaming_patron(&principal.manager_id, &service_id, &patron_id)
        .await?;
    ack()
}
