//! Manager login, password rotation and per-resource authorization.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::password::{hash_password, verify_password};
use super::session::SessionIssuer;
use crate::db::{AccessLevel, Manager, Store, Venue};
use crate::error::require;
use crate::{DoorlistError, Result};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    /// Opaque session token.
    pub session_id: String,
    /// Access level granted to the session.
    pub access_level: AccessLevel,
}

/// Public view of a manager, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub is_password_reset: bool,
    pub venue_ids: Vec<String>,
}

impl From<Manager> for ManagerProfile {
    fn from(manager: Manager) -> Self {
        Self {
            id: manager.id,
            first_name: manager.first_name,
            last_name: manager.last_name,
            email: manager.email,
            username: manager.username,
            is_password_reset: manager.is_password_reset,
            venue_ids: manager.venue_ids,
        }
    }
}

/// Manager authentication and authorization.
pub struct ManagerAuthService {
    store: Arc<dyn Store>,
    issuer: SessionIssuer,
}

impl ManagerAuthService {
    /// Create the service over a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let issuer = SessionIssuer::new(store.clone());
        Self { store, issuer }
    }

    /// Log a manager in and issue a session.
    ///
    /// A manager flagged for password reset may log in with the plaintext
    /// reset password and gets a RESET session; otherwise the password must
    /// match the salted hash.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: &str,
    ) -> Result<LoginResult> {
        require("username", username)?;
        require("password", password)?;
        require("client IP", client_ip)?;

        let manager = self
            .store
            .get_manager_by_username(username)
            .await?
            .ok_or(DoorlistError::ManagerNotFound)?;

        if !Self::password_matches(&manager, password)? {
            warn!(manager_id = %manager.id, client_ip, "Failed manager login");
            return Err(DoorlistError::BadLogin);
        }

        let access_level = AccessLevel::for_password_reset(manager.is_password_reset);
        let session = self.issuer.issue(&manager.id, client_ip, access_level).await?;

        info!(manager_id = %manager.id, %access_level, client_ip, "Manager logged in");
        Ok(LoginResult {
            session_id: session.session_id,
            access_level,
        })
    }

    fn password_matches(manager: &Manager, password: &str) -> Result<bool> {
        if manager.is_password_reset
            && constant_time_eq::constant_time_eq(
                password.as_bytes(),
                manager.password_hash.as_bytes(),
            )
        {
            return Ok(true);
        }
        if manager.salt.is_empty() || manager.password_hash.is_empty() {
            return Ok(false);
        }
        Ok(verify_password(password, &manager.salt, &manager.password_hash)?)
    }

    /// End the session carried by a request.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        require("session", session_id)?;
        if !self.store.deactivate_session(session_id).await? {
            return Err(DoorlistError::Unauthenticated);
        }
        Ok(())
    }

    /// The manager's own profile.
    pub async fn get_self(&self, manager_id: &str) -> Result<ManagerProfile> {
        require("manager ID", manager_id)?;
        let manager = self
            .store
            .get_manager_by_id(manager_id)
            .await?
            .ok_or(DoorlistError::ManagerNotFound)?;
        Ok(manager.into())
    }

    /// Set a new password with a fresh salt and log out every session.
    pub async fn update_password(&self, manager_id: &str, new_password: &str) -> Result<()> {
        require("manager ID", manager_id)?;
        require("new password", new_password)?;

        let hashed = hash_password(new_password)?;
        let invalidated = self
            .store
            .rotate_manager_password(manager_id, &hashed.hash, &hashed.salt)
            .await?
            .ok_or(DoorlistError::ManagerNotFound)?;

        info!(manager_id, invalidated, "Manager password updated, sessions invalidated");
        Ok(())
    }

    /// Venues the manager may operate.
    pub async fn get_venues(&self, manager_id: &str) -> Result<Vec<Venue>> {
        require("manager ID", manager_id)?;
        self.store.get_manager_venues(manager_id).await
    }

    /// Fail with `NoAccess` unless the manager is attached to the venue.
    pub async fn ensure_can_access_venue(&self, manager_id: &str, venue_id: &str) -> Result<()> {
        require("manager ID", manager_id)?;
        require("venue ID", venue_id)?;
        if !self.store.manager_has_venue(manager_id, venue_id).await? {
            return Err(DoorlistError::NoAccess);
        }
        Ok(())
    }

    /// Fail with `NoAccess` unless the manager is attached to the service's venue.
    pub async fn ensure_can_access_service(
        &self,
        manager_id: &str,
        service_id: &str,
    ) -> Result<()> {
        require("manager ID", manager_id)?;
        require("service ID", service_id)?;
        if !self.store.manager_has_service(manager_id, service_id).await? {
            return Err(DoorlistError::NoAccess);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ManagerAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerAuthService").finish()
    }
}
