//! SQLite implementation of the [`Store`] contract.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    CheckIn, Database, DiningPatron, GamingPatron, GamingPatronUpdate, Manager,
    ManagerRepository, Service, ServiceRepository, ServiceType, Session, SessionRepository, Store,
    Venue, VenueRepository,
};
use crate::Result;

/// Store backed by a SQLite database.
///
/// Mutating transactions are serialised through `write_lock`, so SQLite
/// never has two writers from this process competing for the database lock.
/// Reads go straight to the pool.
pub struct SqliteStore {
    db: Database,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Wrap an opened, migrated database.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// Open a fresh in-memory store.
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Manager repository, for provisioning.
    pub fn managers(&self) -> ManagerRepository<'_> {
        ManagerRepository::new(self.db.pool())
    }

    /// Venue repository, for provisioning.
    pub fn venues(&self) -> VenueRepository<'_> {
        VenueRepository::new(self.db.pool())
    }

    fn sessions(&self) -> SessionRepository<'_> {
        SessionRepository::new(self.db.pool())
    }

    fn services(&self) -> ServiceRepository<'_> {
        ServiceRepository::new(self.db.pool())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish()
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_venue_by_id(&self, venue_id: &str) -> Result<Option<Venue>> {
        self.venues().get_by_id(venue_id).await
    }

    async fn get_venue_by_url(&self, url_name: &str) -> Result<Option<Venue>> {
        self.venues().get_by_url(url_name).await
    }

    async fn get_manager_by_id(&self, manager_id: &str) -> Result<Option<Manager>> {
        self.managers().get_by_id(manager_id).await
    }

    async fn get_manager_by_username(&self, username: &str) -> Result<Option<Manager>> {
        self.managers().get_by_username(username).await
    }

    async fn rotate_manager_password(
        &self,
        manager_id: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<Option<u64>> {
        let _guard = self.write_lock.lock().await;
        self.managers()
            .rotate_password(manager_id, password_hash, salt)
            .await
    }

    async fn get_manager_venues(&self, manager_id: &str) -> Result<Vec<Venue>> {
        self.venues().list_for_manager(manager_id).await
    }

    async fn manager_has_venue(&self, manager_id: &str, venue_id: &str) -> Result<bool> {
        self.managers().has_venue(manager_id, venue_id).await
    }

    async fn manager_has_service(&self, manager_id: &str, service_id: &str) -> Result<bool> {
        self.managers().has_service(manager_id, service_id).await
    }

    async fn insert_session_if_absent(&self, session: &Session) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.sessions().insert_if_absent(session).await
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.sessions().get_by_token(session_id).await
    }

    async fn deactivate_session(&self, session_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.sessions().deactivate(session_id).await
    }

    async fn start_service(
        &self,
        venue_id: &str,
        area_id: &str,
        kind: ServiceType,
    ) -> Result<Service> {
        let _guard = self.write_lock.lock().await;
        self.services().start(venue_id, area_id, kind).await
    }

    async fn stop_service(
        &self,
        venue_id: &str,
        area_id: &str,
        kind: ServiceType,
    ) -> Result<Service> {
        let _guard = self.write_lock.lock().await;
        self.services().stop(venue_id, area_id, kind).await
    }

    async fn get_service(&self, service_id: &str) -> Result<Option<Service>> {
        self.services().get_by_id(service_id).await
    }

    async fn add_dining_check_in(
        &self,
        service_id: &str,
        table_number: &str,
        check_in: &CheckIn,
    ) -> Result<String> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .add_dining_check_in(service_id, table_number, check_in)
            .await
    }

    async fn move_dining_group(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .move_dining_group(service_id, table_id, check_in_id, new_table_number)
            .await
    }

    async fn move_dining_table(
        &self,
        service_id: &str,
        table_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .move_dining_table(service_id, table_id, new_table_number)
            .await
    }

    async fn close_dining_table(&self, service_id: &str, table_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services().close_dining_table(service_id, table_id).await
    }

    async fn delete_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .delete_dining_patron(service_id, table_id, check_in_id, patron_id)
            .await
    }

    async fn update_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron: &DiningPatron,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .update_dining_patron(service_id, table_id, check_in_id, patron)
            .await
    }

    async fn add_gaming_patron(&self, service_id: &str, patron: &GamingPatron) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services().add_gaming_patron(service_id, patron).await
    }

    async fn delete_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services().delete_gaming_patron(service_id, patron_id).await
    }

    async fn update_gaming_patron(
        &self,
        service_id: &str,
        patron_id: &str,
        update: &GamingPatronUpdate,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .update_gaming_patron(service_id, patron_id, update)
            .await
    }

    async fn check_out_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.services()
            .check_out_gaming_patron(service_id, patron_id)
            .await
    }
}
