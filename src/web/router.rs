//! Router configuration for Web API.

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{checkin, manager, service, AppState};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let manager_routes = Router::new()
        .route("/login", post(manager::login))
        .route("/logout", post(manager::logout))
        .route("/me", get(manager::me))
        .route("/password", put(manager::update_password))
        .route("/venues", get(manager::venues));

    let area_routes = Router::new()
        .route(
            "/dining-service",
            post(service::start_dining).delete(service::stop_dining),
        )
        .route(
            "/gaming-service",
            post(service::start_gaming).delete(service::stop_gaming),
        );

    let service_routes = Router::new()
        .route("/:service_id", get(service::get_service))
        .route("/:service_id/tables/:table_id/move", post(service::move_table))
        .route("/:service_id/tables/:table_id/close", post(service::close_table))
        .route(
            "/:service_id/tables/:table_id/check-ins/:check_in_id/move",
            post(service::move_group),
        )
        .route(
            "/:service_id/tables/:table_id/check-ins/:check_in_id/patrons/:patron_id",
            patch(service::update_dining_patron)
                .delete(service::delete_dining_patron),
        )
        .route(
            "/:service_id/patrons/:patron_id",
            patch(service::update_gaming_patron)
                .delete(service::delete_gaming_patron),
        )
        .route(
            "/:service_id/patrons/:patron_id/check-out",
            post(service::check_out_gaming_patron),
        );

    let public_routes = Router::new()
        .route("/venues/:venue_id", get(checkin::venue_by_id))
        .route("/by-url/:url_name", get(checkin::venue_by_url))
        .route(
            "/venues/:venue_id/areas/:area_id/gaming-check-in",
            post(checkin::gaming_check_in),
        )
        .route(
            "/venues/:venue_id/areas/:area_id/dining-check-in",
            post(checkin::dining_check_in),
        );

    let api_routes = Router::new()
        .nest("/manager", manager_routes)
        .nest("/venues/:venue_id/areas/:area_id", area_routes)
        .nest("/services", service_routes)
        .nest("/public", public_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
