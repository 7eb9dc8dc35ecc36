//! Venue and area models.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use super::DbPool;
use crate::{DoorlistError, Result};

/// Kind of area, and of the services that run in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    /// Dining room: patrons are seated at tables.
    Dining,
    /// Gaming floor: patrons check in and out individually.
    Gaming,
}

impl ServiceType {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Dining => "DINING",
            ServiceType::Gaming => "GAMING",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DINING" => Ok(ServiceType::Dining),
            "GAMING" => Ok(ServiceType::Gaming),
            _ => Err(format!("unknown service type: {s}")),
        }
    }
}

/// A sub-location of a venue that hosts at most one active service at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    /// Area ID.
    pub id: String,
    /// Dining room or gaming floor.
    #[serde(rename = "type")]
    pub kind: ServiceType,
    /// Short display name.
    pub short_name: String,
    /// Full display name.
    pub name: String,
    /// Whether the area accepts check-ins.
    pub is_open: bool,
    /// Currently running service, if any.
    pub active_service_id: Option<String>,
}

/// A venue with its dining and gaming areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue ID.
    pub id: String,
    /// URL-safe unique name.
    pub url_name: String,
    /// Display name.
    pub name: String,
    /// All areas of the venue, dining and gaming.
    pub areas: Vec<Area>,
}

impl Venue {
    /// Find an area of the given kind by ID.
    pub fn area(&self, area_id: &str, kind: ServiceType) -> Option<&Area> {
        self.areas
            .iter()
            .find(|a| a.id == area_id && a.kind == kind)
    }

    /// Iterate the venue's areas of one kind.
    pub fn areas_of(&self, kind: ServiceType) -> impl Iterator<Item = &Area> {
        self.areas.iter().filter(move |a| a.kind == kind)
    }
}

/// New venue for provisioning.
#[derive(Debug, Clone)]
pub struct NewVenue {
    /// URL-safe unique name.
    pub url_name: String,
    /// Display name.
    pub name: String,
}

impl NewVenue {
    /// Create a new venue definition.
    pub fn new(url_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url_name: url_name.into(),
            name: name.into(),
        }
    }
}

/// New area for provisioning.
#[derive(Debug, Clone)]
pub struct NewArea {
    /// Owning venue.
    pub venue_id: String,
    /// Area kind.
    pub kind: ServiceType,
    /// Short display name.
    pub short_name: String,
    /// Full display name.
    pub name: String,
    /// Whether the area starts open.
    pub is_open: bool,
}

impl NewArea {
    /// Create an open area definition.
    pub fn new(
        venue_id: impl Into<String>,
        kind: ServiceType,
        short_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            venue_id: venue_id.into(),
            kind,
            short_name: short_name.into(),
            name: name.into(),
            is_open: true,
        }
    }

    /// Set whether the area starts open.
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }
}

#[derive(sqlx::FromRow)]
struct VenueRow {
    id: String,
    url_name: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct AreaRow {
    id: String,
    kind: String,
    short_name: String,
    name: String,
    is_open: bool,
    active_service_id: Option<String>,
}

impl TryFrom<AreaRow> for Area {
    type Error = DoorlistError;

    fn try_from(row: AreaRow) -> Result<Self> {
        Ok(Area {
            id: row.id,
            kind: row.kind.parse().map_err(DoorlistError::Database)?,
            short_name: row.short_name,
            name: row.name,
            is_open: row.is_open,
            active_service_id: row.active_service_id,
        })
    }
}

/// Repository for venue and area operations.
pub struct VenueRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> VenueRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new venue with no areas.
    pub async fn create(&self, new_venue: &NewVenue) -> Result<Venue> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO venues (id, url_name, name) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&new_venue.url_name)
            .bind(&new_venue.name)
            .execute(self.pool)
            .await?;

        self.get_by_id(&id).await?.ok_or(DoorlistError::VenueNotFound)
    }

    /// Add an area to a venue.
    pub async fn create_area(&self, new_area: &NewArea) -> Result<Area> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO areas (id, venue_id, kind, short_name, name, is_open, sort_order)
             VALUES (?, ?, ?, ?, ?, ?,
                     (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM areas WHERE venue_id = ?))",
        )
        .bind(&id)
        .bind(&new_area.venue_id)
        .bind(new_area.kind.as_str())
        .bind(&new_area.short_name)
        .bind(&new_area.name)
        .bind(new_area.is_open)
        .bind(&new_area.venue_id)
        .execute(self.pool)
        .await?;

        Ok(Area {
            id,
            kind: new_area.kind,
            short_name: new_area.short_name.clone(),
            name: new_area.name.clone(),
            is_open: new_area.is_open,
            active_service_id: None,
        })
    }

    /// Open or close an area for check-ins.
    pub async fn set_area_open(&self, area_id: &str, is_open: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE areas SET is_open = ? WHERE id = ?")
            .bind(is_open)
            .bind(area_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a venue with its areas by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Venue>> {
        let row = sqlx::query_as::<_, VenueRow>("SELECT id, url_name, name FROM venues WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        self.with_areas(row).await
    }

    /// Get a venue with its areas by URL name.
    pub async fn get_by_url(&self, url_name: &str) -> Result<Option<Venue>> {
        let row = sqlx::query_as::<_, VenueRow>(
            "SELECT id, url_name, name FROM venues WHERE url_name = ?",
        )
        .bind(url_name)
        .fetch_optional(self.pool)
        .await?;
        self.with_areas(row).await
    }

    /// List the venues a manager is attached to.
    pub async fn list_for_manager(&self, manager_id: &str) -> Result<Vec<Venue>> {
        let rows = sqlx::query_as::<_, VenueRow>(
            "SELECT v.id, v.url_name, v.name FROM venues v
             JOIN manager_venues mv ON mv.venue_id = v.id
             WHERE mv.manager_id = ?
             ORDER BY v.name",
        )
        .bind(manager_id)
        .fetch_all(self.pool)
        .await?;

        let mut venues = Vec::with_capacity(rows.len());
        for row in rows {
            let areas = self.areas(&row.id).await?;
            venues.push(Venue {
                id: row.id,
                url_name: row.url_name,
                name: row.name,
                areas,
            });
        }
        Ok(venues)
    }

    async fn with_areas(&self, row: Option<VenueRow>) -> Result<Option<Venue>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let areas = self.areas(&row.id).await?;
        Ok(Some(Venue {
            id: row.id,
            url_name: row.url_name,
            name: row.name,
            areas,
        }))
    }

    async fn areas(&self, venue_id: &str) -> Result<Vec<Area>> {
        let rows = sqlx::query_as::<_, AreaRow>(
            "SELECT id, kind, short_name, name, is_open, active_service_id
             FROM areas WHERE venue_id = ? ORDER BY sort_order",
        )
        .bind(venue_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Area::try_from).collect()
    }
}
