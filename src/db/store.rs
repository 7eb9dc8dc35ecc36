//! The document store contract consumed by the auth, check-in and lifecycle
//! components.
//!
//! Every conditional write here is atomic from the caller's point of view.
//! Callers never perform a read-then-write to enforce an invariant; they ask
//! the store to do the conditional write and react to the error it returns.

use async_trait::async_trait;

use super::{
    CheckIn, DiningPatron, GamingPatron, GamingPatronUpdate, Manager, Service, ServiceType,
    Session, Venue,
};
use crate::Result;

/// Abstract store for venues, managers, sessions and services.
#[async_trait]
pub trait Store: Send + Sync {
    // ------------------------------------------------------------------
    // Venues
    // ------------------------------------------------------------------

    /// Get a venue with its areas by ID.
    async fn get_venue_by_id(&self, venue_id: &str) -> Result<Option<Venue>>;

    /// Get a venue with its areas by URL name.
    async fn get_venue_by_url(&self, url_name: &str) -> Result<Option<Venue>>;

    // ------------------------------------------------------------------
    // Managers
    // ------------------------------------------------------------------

    /// Get a manager by ID.
    async fn get_manager_by_id(&self, manager_id: &str) -> Result<Option<Manager>>;

    /// Get a manager by username.
    async fn get_manager_by_username(&self, username: &str) -> Result<Option<Manager>>;

    /// Store a new password hash and salt, clear the reset flag and
    /// deactivate every session of the manager, all in one atomic write.
    ///
    /// Returns the number of sessions deactivated, or `None` when the manager
    /// does not exist.
    async fn rotate_manager_password(
        &self,
        manager_id: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<Option<u64>>;

    /// Venues the manager is authorized for.
    async fn get_manager_venues(&self, manager_id: &str) -> Result<Vec<Venue>>;

    /// Whether the manager is attached to the venue.
    async fn manager_has_venue(&self, manager_id: &str, venue_id: &str) -> Result<bool>;

    /// Whether the manager is attached to the venue the service runs in.
    async fn manager_has_service(&self, manager_id: &str, service_id: &str) -> Result<bool>;

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Insert the session unless its token already exists.
    ///
    /// Returns false on a token collision; nothing is written in that case.
    async fn insert_session_if_absent(&self, session: &Session) -> Result<bool>;

    /// Get a session by its token.
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Deactivate one session. Returns false when the token is unknown.
    async fn deactivate_session(&self, session_id: &str) -> Result<bool>;


    // ------------------------------------------------------------------
    // Service lifecycle
    // ------------------------------------------------------------------

    /// Start a service of the given type in an area.
    ///
    /// Fails with `AreaNotFound` when the venue has no such area of that
    /// type, and `AreaHasActiveService` when a service is already running.
    async fn start_service(&self, venue_id: &str, area_id: &str, kind: ServiceType)
        -> Result<Service>;

    /// Stop the active service of the given type in an area.
    ///
    /// Fails with `AreaNotFound` or `AreaHasNoActiveService`.
    async fn stop_service(&self, venue_id: &str, area_id: &str, kind: ServiceType)
        -> Result<Service>;

    /// Get a service with all its tables, check-ins and patrons.
    async fn get_service(&self, service_id: &str) -> Result<Option<Service>>;

    // ------------------------------------------------------------------
    // Dining
    // ------------------------------------------------------------------

    /// Append a check-in to the active table with this number, creating the
    /// table when none exists. Returns the table's sitting ID.
    async fn add_dining_check_in(
        &self,
        service_id: &str,
        table_number: &str,
        check_in: &CheckIn,
    ) -> Result<String>;

    /// Move one check-in to the active table with the given number, creating
    /// that table when needed.
    async fn move_dining_group(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        new_table_number: &str,
    ) -> Result<()>;

    /// Renumber a table, merging it into an existing active table with the
    /// target number when there is one.
    async fn move_dining_table(
        &self,
        service_id: &str,
        table_id: &str,
        new_table_number: &str,
    ) -> Result<()>;

    /// Mark a table inactive, keeping its history.
    async fn close_dining_table(&self, service_id: &str, table_id: &str) -> Result<()>;

    /// Delete a dining patron from a check-in.
    async fn delete_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
    ) -> Result<()>;

    /// Persist a dining patron's name and phone number.
    async fn update_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron: &DiningPatron,
    ) -> Result<()>;

    // ------------------------------------------------------------------
    // Gaming
    // ------------------------------------------------------------------

    /// Append a gaming patron to a service.
    async fn add_gaming_patron(&self, service_id: &str, patron: &GamingPatron) -> Result<()>;

    /// Delete a gaming patron.
    async fn delete_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()>;

    /// Apply a partial update to a gaming patron.
    async fn update_gaming_patron(
        &self,
        service_id: &str,
        patron_id: &str,
        update: &GamingPatronUpdate,
    ) -> Result<()>;

    /// Check a gaming patron out now. Already checked-out patrons keep their
    /// original check-out time.
    async fn check_out_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()>;
}
