//! Manager account handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{AuthenticationGate, LoginResult, ManagerAuthService, ManagerProfile};
use crate::checkin::CheckInService;
use crate::db::{Store, Venue};
use crate::lifecycle::ServiceLifecycleService;
use crate::web::dto::{ApiResponse, LoginRequest, UpdatePasswordRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthManager, ClientIp, FullManager};

/// Application state shared across handlers.
///
/// Every component is built over the same injected store.
#[derive(Clone)]
pub struct AppState {
    /// Resolves bearer tokens.
    pub gate: AuthenticationGate,
    /// Manager login and authorization.
    pub auth: Arc<ManagerAuthService>,
    /// Service start/stop and in-service mutations.
    pub lifecycle: Arc<ServiceLifecycleService>,
    /// Anonymous check-in.
    pub checkin: Arc<CheckInService>,
}

impl AppState {
    /// Wire every component over a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let auth = Arc::new(ManagerAuthService::new(store.clone()));
        Self {
            gate: AuthenticationGate::new(store.clone()),
            lifecycle: Arc::new(ServiceLifecycleService::new(store.clone(), auth.clone())),
            checkin: Arc::new(CheckInService::new(store)),
            auth,
        }
    }
}

/// POST /api/manager/login - Manager login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state
        .auth
        .login(&req.username, &req.password, client_ip.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ApiResponse::new(result)))
}

/// POST /api/manager/logout - End the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.auth.logout(&principal.session_id).await?;
    Ok(Json(ApiResponse::new(())))
}

/// GET /api/manager/me - Own profile.
pub async fn me(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
) -> Result<Json<ApiResponse<ManagerProfile>>, ApiError> {
    let profile = state.auth.get_self(&principal.manager_id).await?;
    Ok(Json(ApiResponse::new(profile)))
}

/// PUT /api/manager/password - Rotate the password, logging out every session.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    AuthManager(principal): AuthManager,
    ValidatedJson(req): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .auth
        .update_password(&principal.manager_id, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::new(())))
}

/// GET /api/manager/venues - Venues the manager operates.
pub async fn venues(
    State(state): State<Arc<AppState>>,
    FullManager(principal): FullManager,
) -> Result<Json<ApiResponse<Vec<Venue>>>, ApiError> {
    let venues = state.auth.get_venues(&principal.manager_id).await?;
    Ok(Json(ApiResponse::new(venues)))
}
