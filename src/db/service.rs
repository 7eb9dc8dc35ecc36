//! Service models: dining services with tables, gaming services with patrons.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::venue::ServiceType;
use crate::{DoorlistError, Result};

/// One continuous operating window for an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service ID.
    pub id: String,
    /// Venue the area belongs to.
    pub venue_id: String,
    /// Area the service runs in.
    pub area_id: String,
    /// Start time.
    pub opened_at: DateTime<Utc>,
    /// Stop time, once stopped.
    pub closed_at: Option<DateTime<Utc>>,
    /// False once stopped.
    pub is_active: bool,
    /// Type-specific contents, tagged as `type`.
    #[serde(flatten)]
    pub detail: ServiceDetail,
}

/// Type-specific service contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ServiceDetail {
    /// Dining service: tables holding check-ins.
    #[serde(rename = "DINING")]
    Dining {
        /// Tables in creation order.
        sittings: Vec<Sitting>,
    },
    /// Gaming service: a flat list of patrons.
    #[serde(rename = "GAMING")]
    Gaming {
        /// Patrons in check-in order.
        patrons: Vec<GamingPatron>,
    },
}

impl Service {
    /// The service's type tag.
    pub fn kind(&self) -> ServiceType {
        match self.detail {
            ServiceDetail::Dining { .. } => ServiceType::Dining,
            ServiceDetail::Gaming { .. } => ServiceType::Gaming,
        }
    }

    /// Tables of a dining service; empty for gaming services.
    pub fn sittings(&self) -> &[Sitting] {
        match &self.detail {
            ServiceDetail::Dining { sittings } => sittings,
            ServiceDetail::Gaming { .. } => &[],
        }
    }

    /// Patrons of a gaming service; empty for dining services.
    pub fn gaming_patrons(&self) -> &[GamingPatron] {
        match &self.detail {
            ServiceDetail::Gaming { patrons } => patrons,
            ServiceDetail::Dining { .. } => &[],
        }
    }

    /// Fail with `ServiceIsNotActive` unless the service is running.
    pub fn ensure_active(&self) -> Result<()> {
        if !self.is_active {
            return Err(DoorlistError::ServiceIsNotActive);
        }
        Ok(())
    }

    /// Find a table by ID.
    pub fn sitting(&self, table_id: &str) -> Result<&Sitting> {
        self.sittings()
            .iter()
            .find(|s| s.id == table_id)
            .ok_or(DoorlistError::TableNotFound)
    }

    /// Find the active table with the given number.
    pub fn active_sitting_by_number(&self, table_number: &str) -> Option<&Sitting> {
        self.sittings()
            .iter()
            .find(|s| s.is_active && s.table_number == table_number)
    }

    /// Walk table, check-in, patron in that order, failing at the first miss.
    pub fn dining_patron(
        &self,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
    ) -> Result<&DiningPatron> {
        self.sitting(table_id)?
            .check_in(check_in_id)?
            .people
            .iter()
            .find(|p| p.id == patron_id)
            .ok_or(DoorlistError::PatronNotFound)
    }

    /// Find a gaming patron by ID.
    pub fn gaming_patron(&self, patron_id: &str) -> Result<&GamingPatron> {
        self.gaming_patrons()
            .iter()
            .find(|p| p.id == patron_id)
            .ok_or(DoorlistError::PatronNotFound)
    }

    /// Total number of dining patrons checked in across all tables.
    pub fn dining_head_count(&self) -> usize {
        self.sittings()
            .iter()
            .flat_map(|s| s.check_ins.iter())
            .map(|c| c.people.len())
            .sum()
    }
}

/// A table within a dining service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitting {
    /// Sitting ID.
    pub id: String,
    /// Table number as shown in the venue.
    pub table_number: String,
    /// When the first group sat down.
    pub created_at: DateTime<Utc>,
    /// False once the table is closed.
    pub is_active: bool,
    /// Groups seated at this table, oldest first.
    pub check_ins: Vec<CheckIn>,
}

impl Sitting {
    /// Find a check-in at this table.
    pub fn check_in(&self, check_in_id: &str) -> Result<&CheckIn> {
        self.check_ins
            .iter()
            .find(|c| c.id == check_in_id)
            .ok_or(DoorlistError::CheckInNotFound)
    }
}

/// A group of dining patrons admitted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Check-in ID.
    pub id: String,
    /// Admission time.
    pub time: DateTime<Utc>,
    /// The group's members.
    pub people: Vec<DiningPatron>,
}

impl CheckIn {
    /// Create a check-in stamped now, giving every patron a fresh ID.
    pub fn new(people: Vec<NewDiningPatron>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            time: Utc::now(),
            people: people
                .into_iter()
                .map(|p| DiningPatron {
                    id: Uuid::new_v4().to_string(),
                    first_name: p.first_name,
                    phone_number: p.phone_number,
                })
                .collect(),
        }
    }
}

/// A dining patron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningPatron {
    /// Patron ID.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Contact phone number.
    pub phone_number: String,
}

/// Dining patron details as submitted at check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiningPatron {
    /// First name.
    pub first_name: String,
    /// Contact phone number.
    pub phone_number: String,
}

/// Partial update of a dining patron.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiningPatronUpdate {
    /// New first name.
    pub first_name: Option<String>,
    /// New phone number.
    pub phone_number: Option<String>,
}

impl DiningPatronUpdate {
    /// Apply the present fields in place.
    pub fn apply(&self, patron: &mut DiningPatron) {
        if let Some(first_name) = &self.first_name {
            patron.first_name = first_name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            patron.phone_number = phone_number.clone();
        }
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.phone_number.is_none()
    }
}

/// A gaming patron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamingPatron {
    /// Patron ID.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Check-in time.
    pub check_in_time: DateTime<Utc>,
    /// Check-out time; `None` until checked out.
    pub check_out_time: Option<DateTime<Utc>>,
    /// False once checked out.
    pub is_active: bool,
}

impl GamingPatron {
    /// Create a patron checked in now.
    pub fn check_in(first_name: String, last_name: String, phone_number: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            phone_number,
            check_in_time: Utc::now(),
            check_out_time: None,
            is_active: true,
        }
    }
}

/// Partial update of a gaming patron.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamingPatronUpdate {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone_number: Option<String>,
}

impl GamingPatronUpdate {
    /// Apply the present fields in place.
    pub fn apply(&self, patron: &mut GamingPatron) {
        if let Some(first_name) = &self.first_name {
            patron.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            patron.last_name = last_name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            patron.phone_number = phone_number.clone();
        }
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dining_service() -> Service {
        let patron = DiningPatron {
            id: "p1".into(),
            first_name: "Ana".into(),
            phone_number: "0400000000".into(),
        };
        Service {
            id: "s1".into(),
            venue_id: "v1".into(),
            area_id: "a1".into(),
            opened_at: Utc::now(),
            closed_at: None,
            is_active: true,
            detail: ServiceDetail::Dining {
                sittings: vec![Sitting {
                    id: "t1".into(),
                    table_number: "12".into(),
                    created_at: Utc::now(),
                    is_active: true,
                    check_ins: vec![CheckIn {
                        id: "c1".into(),
                        time: Utc::now(),
                        people: vec![patron],
                    }],
                }],
            },
        }
    }

    #[test]
    fn test_dining_patron_walk_order() {
        let service = dining_service();
        assert!(service.dining_patron("t1", "c1", "p1").is_ok());
        assert!(matches!(
            service.dining_patron("nope", "nope", "nope"),
            Err(DoorlistError::TableNotFound)
        ));
        assert!(matches!(
            service.dining_patron("t1", "nope", "nope"),
            Err(DoorlistError::CheckInNotFound)
        ));
        assert!(matches!(
            service.dining_patron("t1", "c1", "nope"),
            Err(DoorlistError::PatronNotFound)
        ));
    }

    #[test]
    fn test_inactive_service() {
        let mut service = dining_service();
        assert!(service.ensure_active().is_ok());
        service.is_active = false;
        assert!(matches!(
            service.ensure_active(),
            Err(DoorlistError::ServiceIsNotActive)
        ));
    }

    #[test]
    fn test_active_sitting_by_number_skips_closed_tables() {
        let mut service = dining_service();
        assert!(service.active_sitting_by_number("12").is_some());
        if let ServiceDetail::Dining { sittings } = &mut service.detail {
            sittings[0].is_active = false;
        }
        assert!(service.active_sitting_by_number("12").is_none());
    }

    #[test]
    fn test_kind_and_accessors() {
        let service = dining_service();
        assert_eq!(service.kind(), ServiceType::Dining);
        assert!(service.gaming_patrons().is_empty());
        assert_eq!(service.dining_head_count(), 1);
        assert!(matches!(
            service.gaming_patron("p1"),
            Err(DoorlistError::PatronNotFound)
        ));
    }

    #[test]
    fn test_check_in_assigns_fresh_ids() {
        let check_in = CheckIn::new(vec![
            NewDiningPatron {
                first_name: "Ana".into(),
                phone_number: "1".into(),
            },
            NewDiningPatron {
                first_name: "Ben".into(),
                phone_number: "2".into(),
            },
        ]);
        assert_eq!(check_in.people.len(), 2);
        assert_ne!(check_in.people[0].id, check_in.people[1].id);
    }

    #[test]
    fn test_gaming_patron_check_in_defaults() {
        let patron = GamingPatron::check_in("Ana".into(), "Diaz".into(), "1".into());
        assert!(patron.is_active);
        assert!(patron.check_out_time.is_none());
    }

    #[test]
    fn test_updates_apply_only_present_fields() {
        let mut patron = DiningPatron {
            id: "p1".into(),
            first_name: "Ana".into(),
            phone_number: "1".into(),
        };
        let update = DiningPatronUpdate {
            first_name: Some("Anna".into()),
            phone_number: None,
        };
        update.apply(&mut patron);
        assert_eq!(patron.first_name, "Anna");
        assert_eq!(patron.phone_number, "1");
        assert!(DiningPatronUpdate::default().is_empty());
        assert!(GamingPatronUpdate::default().is_empty());
    }

    #[test]
    fn test_service_serializes_type_tag() {
        let json = serde_json::to_value(dining_service()).unwrap();
        assert_eq!(json["type"], "DINING");
        assert_eq!(json["sittings"][0]["tableNumber"], "12");
        assert_eq!(json["sittings"][0]["checkIns"][0]["people"][0]["firstName"], "Ana");
    }
}
