//! Manager-facing service operations.
//!
//! Every operation authorizes the manager against the venue or service
//! before it touches any service state.

use std::sync::Arc;

use tracing::info;

use crate::auth::ManagerAuthService;
use crate::db::{DiningPatronUpdate, GamingPatronUpdate, Service, ServiceType, Store};
use crate::error::require;
use crate::{DoorlistError, Result};

/// Starts and stops services and mutates what happens inside them.
pub struct ServiceLifecycleService {
    store: Arc<dyn Store>,
    auth: Arc<ManagerAuthService>,
}

impl ServiceLifecycleService {
    /// Create the service.
    pub fn new(store: Arc<dyn Store>, auth: Arc<ManagerAuthService>) -> Self {
        Self { store, auth }
    }

    /// Start a dining service in an area.
    pub async fn start_dining_service(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
    ) -> Result<Service> {
        self.start(manager_id, venue_id, area_id, ServiceType::Dining)
            .await
    }

    /// Start a gaming service in an area.
    pub async fn start_gaming_service(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
    ) -> Result<Service> {
        self.start(manager_id, venue_id, area_id, ServiceType::Gaming)
            .await
    }

    /// Stop the dining service running in an area.
    pub async fn stop_dining_service(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
    ) -> Result<Service> {
        self.stop(manager_id, venue_id, area_id, ServiceType::Dining)
            .await
    }

    /// Stop the gaming service running in an area.
    pub async fn stop_gaming_service(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
    ) -> Result<Service> {
        self.stop(manager_id, venue_id, area_id, ServiceType::Gaming)
            .await
    }

    async fn start(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
        kind: ServiceType,
    ) -> Result<Service> {
        require("area ID", area_id)?;
        self.auth.ensure_can_access_venue(manager_id, venue_id).await?;

        let service = self.store.start_service(venue_id, area_id, kind).await?;
        info!(
            manager_id,
            venue_id,
            area_id,
            service_id = %service.id,
            %kind,
            "Service started"
        );
        Ok(service)
    }

    async fn stop(
        &self,
        manager_id: &str,
        venue_id: &str,
        area_id: &str,
        kind: ServiceType,
    ) -> Result<Service> {
        require("area ID", area_id)?;
        self.auth.ensure_can_access_venue(manager_id, venue_id).await?;

        let service = self.store.stop_service(venue_id, area_id, kind).await?;
        info!(
            manager_id,
            venue_id,
            area_id,
            service_id = %service.id,
            %kind,
            "Service stopped"
        );
        Ok(service)
    }

    /// Full view of a service, active or not.
    pub async fn get_service(&self, manager_id: &str, service_id: &str) -> Result<Service> {
        self.auth
            .ensure_can_access_service(manager_id, service_id)
            .await?;
        self.load(service_id).await
    }

    async fn load(&self, service_id: &str) -> Result<Service> {
        self.store
            .get_service(service_id)
            .await?
            .ok_or(DoorlistError::ServiceNotFound)
    }

    /// Load a service the manager may access and require it to be an active
    /// service of the given kind. A service of the other kind is reported as
    /// `ServiceNotFound`.
    async fn load_active(
        &self,
        manager_id: &str,
        service_id: &str,
        kind: ServiceType,
    ) -> Result<Service> {
        self.auth
            .ensure_can_access_service(manager_id, service_id)
            .await?;
        let service = self.load(service_id).await?;
        if service.kind() != kind {
            return Err(DoorlistError::ServiceNotFound);
        }
        service.ensure_active()?;
        Ok(service)
    }

    /// Move one check-in to another table number.
    pub async fn move_dining_group(
        &self,
        manager_id: &str,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        require("table ID", table_id)?;
        require("check-in ID", check_in_id)?;
        require("table number", new_table_number)?;
        let service = self
            .load_active(manager_id, service_id, ServiceType::Dining)
            .await?;
        service.sitting(table_id)?.check_in(check_in_id)?;

        self.store
            .move_dining_group(service_id, table_id, check_in_id, new_table_number)
            .await?;
        info!(manager_id, service_id, table_id, check_in_id, new_table_number, "Group moved");
        Ok(())
    }

    /// Move a whole table to another number, merging with any active table
    /// already using it.
    pub async fn move_dining_table(
        &self,
        manager_id: &str,
        service_id: &str,
        table_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        require("table ID", table_id)?;
        require("table number", new_table_number)?;
        let service = self
            .load_active(manager_id, service_id, ServiceType::Dining)
            .await?;
        let merged = service
            .active_sitting_by_number(new_table_number)
            .is_some_and(|s| s.id != table_id);
        service.sitting(table_id)?;

        self.store
            .move_dining_table(service_id, table_id, new_table_number)
            .await?;
        info!(manager_id, service_id, table_id, new_table_number, merged, "Table moved");
        Ok(())
    }

    /// Close a table, keeping its check-ins.
    pub async fn close_dining_table(
        &self,
        manager_id: &str,
        service_id: &str,
        table_id: &str,
    ) -> Result<()> {
        require("table ID", table_id)?;
        let service = self
            .load_active(manager_id, service_id, ServiceType::Dining)
            .await?;
        service.sitting(table_id)?;

        self.store.close_dining_table(service_id, table_id).await?;
        info!(manager_id, service_id, table_id, "Table closed");
        Ok(())
    }

    /// Remove a patron from a dining check-in.
    pub async fn delete_dining_patron(
        &self,
        manager_id: &str,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
    ) -> Result<()> {
        require("patron ID", patron_id)?;
        let service = self
            .load_active(manager_id, service_id, ServiceType::Dining)
            .await?;
        service.dining_patron(table_id, check_in_id, patron_id)?;

        self.store
            .delete_dining_patron(service_id, table_id, check_in_id, patron_id)
            .await
    }

    /// Change a dining patron's name or phone number.
    pub async fn update_dining_patron(
        &self,
        manager_id: &str,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
        update: &DiningPatronUpdate,
    ) -> Result<()> {
        require("patron ID", patron_id)?;
        if update.is_empty() {
            return Err(DoorlistError::InvalidInput("nothing to update".to_string()));
        }
        let service = self
            .load_active(manager_id, service_id, ServiceType::Dining)
            .await?;
        let mut patron = service
            .dining_patron(table_id, check_in_id, patron_id)?
            .clone();
        update.apply(&mut patron);

        self.store
            .update_dining_patron(service_id, table_id, check_in_id, &patron)
            .await
    }

    /// Remove a gaming patron.
    pub async fn delete_gaming_patron(
        &self,
        manager_id: &str,
        service_id: &str,
        patron_id: &str,
    ) -> Result<()> {
        require("patron ID", patron_id)?;
        self.load_active(manager_id, service_id, ServiceType::Gaming)
            .await?;
        self.store.delete_gaming_patron(service_id, patron_id).await
    }

    /// Change a gaming patron's details.
    pub async fn update_gaming_patron(
        &self,
        manager_id: &str,
        service_id: &str,
        patron_id: &str,
        update: &GamingPatronUpdate,
    ) -> Result<()> {
        require("patron ID", patron_id)?;
        if update.is_empty() {
            return Err(DoorlistError::InvalidInput("nothing to update".to_string()));
        }
        self.load_active(manager_id, service_id, ServiceType::Gaming)
            .await?;
        self.store
            .update_gaming_patron(service_id, patron_id, update)
            .await
    }

    /// Check a gaming patron out.
    pub async fn check_out_gaming_patron(
        &self,
        manager_id: &str,
        service_id: &str,
        patron_id: &str,
    ) -> Result<()> {
        require("patron ID", patron_id)?;
        self.load_active(manager_id, service_id, ServiceType::Gaming)
            .await?;
        self.store
            .check_out_gaming_patron(service_id, patron_id)
            .await?;
        info!(manager_id, service_id, patron_id, "Gaming patron checked out");
        Ok(())
    }
}

impl std::fmt::Debug for ServiceLifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLifecycleService").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        CheckIn, GamingPatron, NewArea, NewDiningPatron, NewManager, NewVenue, SqliteStore,
    };

    struct Fixture {
        store: Arc<SqliteStore>,
        lifecycle: ServiceLifecycleService,
        manager_id: String,
        outsider_id: String,
        venue_id: String,
        dining_area: String,
        gaming_area: String,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let managers = store.managers();
        let manager = managers
            .create(&NewManager::with_reset_password("ada", "temp"))
            .await
            .unwrap();
        let outsider = managers
            .create(&NewManager::with_reset_password("eve", "temp"))
            .await
            .unwrap();

        let venues = store.venues();
        let venue = venues.create(&NewVenue::new("local", "The Local")).await.unwrap();
        let dining = venues
            .create_area(&NewArea::new(&venue.id, ServiceType::Dining, "BIS", "Bistro"))
            .await
            .unwrap();
        let gaming = venues
            .create_area(&NewArea::new(&venue.id, ServiceType::Gaming, "TAB", "TAB Room"))
            .await
            .unwrap();
        managers.grant_venue(&manager.id, &venue.id).await.unwrap();

        let auth = Arc::new(ManagerAuthService::new(store.clone()));
        let lifecycle = ServiceLifecycleService::new(store.clone(), auth);
        Fixture {
            store,
            lifecycle,
            manager_id: manager.id,
            outsider_id: outsider.id,
            venue_id: venue.id,
            dining_area: dining.id,
            gaming_area: gaming.id,
        }
    }

    fn group(names: &[&str]) -> CheckIn {
        CheckIn::new(
            names
                .iter()
                .map(|n| NewDiningPatron {
                    first_name: n.to_string(),
                    phone_number: "0400000000".to_string(),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_start_and_stop_dining_service() {
        let f = setup().await;
        let service = f
            .lifecycle
            .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        assert_eq!(service.kind(), ServiceType::Dining);

        assert!(matches!(
            f.lifecycle
                .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
                .await,
            Err(DoorlistError::AreaHasActiveService)
        ));

        f.lifecycle
            .stop_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        assert!(matches!(
            f.lifecycle
                .stop_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
                .await,
            Err(DoorlistError::AreaHasNoActiveService)
        ));
    }

    #[tokio::test]
    async fn test_outsider_gets_no_access() {
        let f = setup().await;
        assert!(matches!(
            f.lifecycle
                .start_gaming_service(&f.outsider_id, &f.venue_id, &f.gaming_area)
                .await,
            Err(DoorlistError::NoAccess)
        ));

        let service = f
            .lifecycle
            .start_gaming_service(&f.manager_id, &f.venue_id, &f.gaming_area)
            .await
            .unwrap();
        assert!(matches!(
            f.lifecycle.get_service(&f.outsider_id, &service.id).await,
            Err(DoorlistError::NoAccess)
        ));
        assert!(matches!(
            f.lifecycle
                .check_out_gaming_patron(&f.outsider_id, &service.id, "p")
                .await,
            Err(DoorlistError::NoAccess)
        ));
    }

    #[tokio::test]
    async fn test_dining_operations_on_stopped_service() {
        let f = setup().await;
        let service = f
            .lifecycle
            .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        let check_in = group(&["Ana"]);
        let table = f
            .store
            .add_dining_check_in(&service.id, "1", &check_in)
            .await
            .unwrap();
        f.lifecycle
            .stop_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();

        assert!(matches!(
            f.lifecycle
                .close_dining_table(&f.manager_id, &service.id, &table)
                .await,
            Err(DoorlistError::ServiceIsNotActive)
        ));
        assert!(matches!(
            f.lifecycle
                .delete_dining_patron(
                    &f.manager_id,
                    &service.id,
                    &table,
                    &check_in.id,
                    &check_in.people[0].id
                )
                .await,
            Err(DoorlistError::ServiceIsNotActive)
        ));

        // The audit view still works after the service stopped
        let audit = f.lifecycle.get_service(&f.manager_id, &service.id).await.unwrap();
        assert!(!audit.is_active);
        assert_eq!(audit.dining_head_count(), 1);
    }

    #[tokio::test]
    async fn test_update_dining_patron_walks_in_order() {
        let f = setup().await;
        let service = f
            .lifecycle
            .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        let check_in = group(&["Ana"]);
        let table = f
            .store
            .add_dining_check_in(&service.id, "1", &check_in)
            .await
            .unwrap();
        let patron_id = check_in.people[0].id.clone();
        let update = DiningPatronUpdate {
            first_name: Some("Anna".into()),
            phone_number: None,
        };

        for (table_id, check_in_id, patron, expected) in [
            ("nope", "nope", "nope", "E_TABLE_NOT_FOUND"),
            (table.as_str(), "nope", "nope", "E_CHECK_IN_NOT_FOUND"),
            (table.as_str(), check_in.id.as_str(), "nope", "E_PATRON_NOT_FOUND"),
        ] {
            let err = f
                .lifecycle
                .update_dining_patron(
                    &f.manager_id,
                    &service.id,
                    table_id,
                    check_in_id,
                    patron,
                    &update,
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), expected);
        }

        f.lifecycle
            .update_dining_patron(
                &f.manager_id,
                &service.id,
                &table,
                &check_in.id,
                &patron_id,
                &update,
            )
            .await
            .unwrap();
        let loaded = f.lifecycle.get_service(&f.manager_id, &service.id).await.unwrap();
        let patron = loaded.dining_patron(&table, &check_in.id, &patron_id).unwrap();
        assert_eq!(patron.first_name, "Anna");
        assert_eq!(patron.phone_number, "0400000000");
    }

    #[tokio::test]
    async fn test_move_and_close_tables() {
        let f = setup().await;
        let service = f
            .lifecycle
            .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        let a = group(&["Ana"]);
        let b = group(&["Ben"]);
        let table_a = f.store.add_dining_check_in(&service.id, "1", &a).await.unwrap();
        let table_b = f.store.add_dining_check_in(&service.id, "2", &b).await.unwrap();

        f.lifecycle
            .move_dining_table(&f.manager_id, &service.id, &table_a, "2")
            .await
            .unwrap();
        let merged = f.lifecycle.get_service(&f.manager_id, &service.id).await.unwrap();
        assert!(merged.sitting(&table_a).is_err());
        assert_eq!(merged.sitting(&table_b).unwrap().check_ins.len(), 2);

        f.lifecycle
            .move_dining_group(&f.manager_id, &service.id, &table_b, &a.id, "7")
            .await
            .unwrap();
        f.lifecycle
            .close_dining_table(&f.manager_id, &service.id, &table_b)
            .await
            .unwrap();

        let loaded = f.lifecycle.get_service(&f.manager_id, &service.id).await.unwrap();
        assert!(!loaded.sitting(&table_b).unwrap().is_active);
        let seven = loaded.active_sitting_by_number("7").unwrap();
        assert_eq!(seven.check_ins[0].id, a.id);
    }

    #[tokio::test]
    async fn test_gaming_patron_operations() {
        let f = setup().await;
        let service = f
            .lifecycle
            .start_gaming_service(&f.manager_id, &f.venue_id, &f.gaming_area)
            .await
            .unwrap();
        let patron = GamingPatron::check_in("Ana".into(), "Diaz".into(), "0400000000".into());
        f.store.add_gaming_patron(&service.id, &patron).await.unwrap();

        assert!(matches!(
            f.lifecycle
                .update_gaming_patron(
                    &f.manager_id,
                    &service.id,
                    &patron.id,
                    &GamingPatronUpdate::default()
                )
                .await,
            Err(DoorlistError::InvalidInput(_))
        ));

        let update = GamingPatronUpdate {
            phone_number: Some("0411111111".into()),
            ..Default::default()
        };
        f.lifecycle
            .update_gaming_patron(&f.manager_id, &service.id, &patron.id, &update)
            .await
            .unwrap();
        f.lifecycle
            .check_out_gaming_patron(&f.manager_id, &service.id, &patron.id)
            .await
            .unwrap();

        let loaded = f.lifecycle.get_service(&f.manager_id, &service.id).await.unwrap();
        let stored = loaded.gaming_patron(&patron.id).unwrap();
        assert_eq!(stored.phone_number, "0411111111");
        assert!(!stored.is_active);

        f.lifecycle
            .delete_gaming_patron(&f.manager_id, &service.id, &patron.id)
            .await
            .unwrap();
        assert!(matches!(
            f.lifecycle
                .delete_gaming_patron(&f.manager_id, &service.id, &patron.id)
                .await,
            Err(DoorlistError::PatronNotFound)
        ));
    }

    #[tokio::test]
    async fn test_operations_reject_other_kind_of_service() {
        let f = setup().await;
        let gaming = f
            .lifecycle
            .start_gaming_service(&f.manager_id, &f.venue_id, &f.gaming_area)
            .await
            .unwrap();
        let dining = f
            .lifecycle
            .start_dining_service(&f.manager_id, &f.venue_id, &f.dining_area)
            .await
            .unwrap();
        let table = f
            .store
            .add_dining_check_in(&dining.id, "1", &group(&["Ana"]))
            .await
            .unwrap();

        assert!(matches!(
            f.lifecycle
                .close_dining_table(&f.manager_id, &gaming.id, &table)
                .await,
            Err(DoorlistError::ServiceNotFound)
        ));
        assert!(matches!(
            f.lifecycle
                .move_dining_table(&f.manager_id, &gaming.id, &table, "2")
                .await,
            Err(DoorlistError::ServiceNotFound)
        ));

        let patron = GamingPatron::check_in("Ben".into(), "Lee".into(), "0400000000".into());
        f.store.add_gaming_patron(&gaming.id, &patron).await.unwrap();
        assert!(matches!(
            f.lifecycle
                .check_out_gaming_patron(&f.manager_id, &dining.id, &patron.id)
                .await,
            Err(DoorlistError::ServiceNotFound)
        ));
        assert!(matches!(
            f.lifecycle
                .delete_gaming_patron(&f.manager_id, &dining.id, &patron.id)
                .await,
            Err(DoorlistError::ServiceNotFound)
        ));

        // Nothing moved
        let loaded = f.lifecycle.get_service(&f.manager_id, &dining.id).await.unwrap();
        assert!(loaded.sitting(&table).unwrap().is_active);
        let loaded = f.lifecycle.get_service(&f.manager_id, &gaming.id).await.unwrap();
        assert!(loaded.gaming_patron(&patron.id).unwrap().is_active);
    }
}
