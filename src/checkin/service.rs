//! Patron-facing check-in into venue areas.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::db::{CheckIn, GamingPatron, NewDiningPatron, ServiceType, Store, Venue};
use crate::error::require;
use crate::{DoorlistError, Result};

/// Maximum length of a patron name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length of a phone number.
pub const MAX_PHONE_LENGTH: usize = 20;

/// Maximum length of a table number.
pub const MAX_TABLE_NUMBER_LENGTH: usize = 16;

/// Gaming check-in as submitted by a patron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamingCheckIn {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Dining check-in as submitted by a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningCheckIn {
    pub table_number: String,
    pub people: Vec<NewDiningPatron>,
}

/// What a dining check-in produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningCheckInReceipt {
    /// Service the group was admitted to.
    pub service_id: String,
    /// Table the check-in was added to.
    pub table_id: String,
    /// The recorded check-in.
    pub check_in: CheckIn,
}

fn check_length(field: &str, value: &str, max: usize) -> Result<()> {
    require(field, value)?;
    if value.chars().count() > max {
        return Err(DoorlistError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn check_phone(value: &str) -> Result<()> {
    check_length("phone number", value, MAX_PHONE_LENGTH)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !valid {
        return Err(DoorlistError::InvalidInput(
            "phone number contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

impl GamingCheckIn {
    fn validate(&self) -> Result<()> {
        check_length("first name", &self.first_name, MAX_NAME_LENGTH)?;
        check_length("last name", &self.last_name, MAX_NAME_LENGTH)?;
        check_phone(&self.phone_number)
    }
}

impl DiningCheckIn {
    fn validate(&self) -> Result<()> {
        check_length("table number", &self.table_number, MAX_TABLE_NUMBER_LENGTH)?;
        if self.people.is_empty() {
            return Err(DoorlistError::missing("at least one patron"));
        }
        for person in &self.people {
            check_length("first name", &person.first_name, MAX_NAME_LENGTH)?;
            check_phone(&person.phone_number)?;
        }
        Ok(())
    }
}

/// Anonymous check-in into dining and gaming areas.
pub struct CheckInService {
    store: Arc<dyn Store>,
}

impl CheckInService {
    /// Create the service over a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Public venue lookup by ID.
    pub async fn get_venue(&self, venue_id: &str) -> Result<Venue> {
        require("venue ID", venue_id)?;
        self.store
            .get_venue_by_id(venue_id)
            .await?
            .ok_or(DoorlistError::VenueNotFound)
    }

    /// Public venue lookup by URL name.
    pub async fn get_venue_by_url(&self, url_name: &str) -> Result<Venue> {
        require("venue URL name", url_name)?;
        self.store
            .get_venue_by_url(url_name)
            .await?
            .ok_or(DoorlistError::VenueNotFound)
    }

    /// Resolve the ID of the service running in an open area.
    async fn active_service_id(
        &self,
        venue_id: &str,
        area_id: &str,
        kind: ServiceType,
    ) -> Result<String> {
        require("area ID", area_id)?;
        let venue = self.get_venue(venue_id).await?;
        let area = venue
            .area(area_id, kind)
            .ok_or(DoorlistError::AreaNotFound)?;
        if !area.is_open {
            return Err(DoorlistError::AreaIsClosed);
        }
        area.active_service_id
            .clone()
            .ok_or(DoorlistError::ServiceNotFound)
    }

    /// Check a gaming patron in to the area's active service.
    pub async fn submit_gaming_check_in(
        &self,
        venue_id: &str,
        area_id: &str,
        check_in: GamingCheckIn,
    ) -> Result<GamingPatron> {
        check_in.validate()?;
        let service_id = self
            .active_service_id(venue_id, area_id, ServiceType::Gaming)
            .await?;

        let patron = GamingPatron::check_in(
            check_in.first_name,
            check_in.last_name,
            check_in.phone_number,
        );
        self.store.add_gaming_patron(&service_id, &patron).await?;

        info!(venue_id, area_id, service_id = %service_id, "Gaming check-in recorded");
        Ok(patron)
    }

    /// Check a dining group in, joining the active table with that number or
    /// opening a new one.
    pub async fn submit_dining_check_in(
        &self,
        venue_id: &str,
        area_id: &str,
        check_in: DiningCheckIn,
    ) -> Result<DiningCheckInReceipt> {
        check_in.validate()?;
        let service_id = self
            .active_service_id(venue_id, area_id, ServiceType::Dining)
            .await?;

        let record = CheckIn::new(check_in.people);
        let table_id = self
            .store
            .add_dining_check_in(&service_id, &check_in.table_number, &record)
            .await?;

        info!(
            venue_id,
            area_id,
            service_id = %service_id,
            table_number = %check_in.table_number,
            people = record.people.len(),
            "Dining check-in recorded"
        );
        Ok(DiningCheckInReceipt {
            service_id,
            table_id,
            check_in: record,
        })
    }
}

impl std::fmt::Debug for CheckInService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInService").finish()
    }
}
