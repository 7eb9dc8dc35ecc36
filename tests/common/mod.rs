//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use doorlist::db::{NewArea, NewManager, NewVenue, ServiceType, SqliteStore};
use doorlist::web::handlers::AppState;
use doorlist::web::router::{create_health_router, create_router};
use doorlist::{hash_password, Store};

/// Reset password provisioned for the bootstrap manager.
pub const RESET_PASSWORD: &str = "first-login";

/// Password of the fully set-up manager.
pub const PASSWORD: &str = "correct horse battery";

/// Address sent as `X-Forwarded-For` on login.
pub const CLIENT_IP: &str = "203.0.113.7";

/// A venue with one dining and one gaming area and two managers attached.
pub struct Fixture {
    pub store: Arc<SqliteStore>,
    pub venue_id: String,
    pub dining_area: String,
    pub gaming_area: String,
    /// Manager with a real password, attached to the venue.
    pub manager_id: String,
    /// Manager still on a reset password, attached to the venue.
    pub reset_manager_id: String,
    /// Manager with a real password and no venues.
    pub outsider_id: String,
}

impl Fixture {
    /// Provision the fixture in a fresh in-memory store.
    pub async fn new() -> Self {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

        let venues = store.venues();
        let venue = venues
            .create(&NewVenue::new("the-local", "The Local"))
            .await
            .unwrap();
        let dining = venues
            .create_area(&NewArea::new(&venue.id, ServiceType::Dining, "BIS", "Bistro"))
            .await
            .unwrap();
        let gaming = venues
            .create_area(&NewArea::new(&venue.id, ServiceType::Gaming, "TAB", "TAB Room"))
            .await
            .unwrap();

        let managers = store.managers();
        let hashed = hash_password(PASSWORD).unwrap();
        let manager = managers
            .create(
                &NewManager::with_hash("alex", &hashed.hash, &hashed.salt)
                    .with_name("Alex", "Moore")
                    .with_email("alex@example.com"),
            )
            .await
            .unwrap();
        managers.grant_venue(&manager.id, &venue.id).await.unwrap();

        let reset_manager = managers
            .create(&NewManager::with_reset_password("sam", RESET_PASSWORD))
            .await
            .unwrap();
        managers
            .grant_venue(&reset_manager.id, &venue.id)
            .await
            .unwrap();

        let hashed = hash_password(PASSWORD).unwrap();
        let outsider = managers
            .create(&NewManager::with_hash("kim", &hashed.hash, &hashed.salt))
            .await
            .unwrap();

        Self {
            store,
            venue_id: venue.id,
            dining_area: dining.id,
            gaming_area: gaming.id,
            manager_id: manager.id,
            reset_manager_id: reset_manager.id,
            outsider_id: outsider.id,
        }
    }

    /// The store as the trait object every component takes.
    pub fn dyn_store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    /// An HTTP test server over the fixture's store.
    pub fn server(&self) -> TestServer {
        let state = Arc::new(AppState::new(self.dyn_store()));
        let router = create_router(state, &[]).merge(create_health_router());
        TestServer::new(router).expect("Failed to create test server")
    }
}

/// Log in over HTTP and return the response body.
pub async fn login(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/manager/login")
        .add_header("x-forwarded-for", CLIENT_IP)
        .json(&json!({ "username": username, "password": password }))
        .await
        .json::<Value>()
}

/// Log in over HTTP and return the session token.
pub async fn login_token(server: &TestServer, username: &str, password: &str) -> String {
    let body = login(server, username, password).await;
    body["data"]["sessionId"]
        .as_str()
        .expect("No session token")
        .to_string()
}

/// `Bearer <token>` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
