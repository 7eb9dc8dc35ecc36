//! Service repository: start/stop and everything that happens inside a service.
//!
//! Each mutating method runs in a single transaction, so a reader never sees
//! a check-in duplicated or dropped halfway through a move or merge.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{
    CheckIn, DbPool, DiningPatron, GamingPatron, GamingPatronUpdate, Service, ServiceDetail,
    ServiceType, Sitting,
};
use crate::{DoorlistError, Result};

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: String,
    venue_id: String,
    area_id: String,
    kind: String,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SittingRow {
    id: String,
    table_number: String,
    created_at: DateTime<Utc>,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct CheckInRow {
    id: String,
    sitting_id: String,
    time: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DiningPatronRow {
    id: String,
    check_in_id: String,
    first_name: String,
    phone_number: String,
}

#[derive(sqlx::FromRow)]
struct GamingPatronRow {
    id: String,
    first_name: String,
    last_name: String,
    phone_number: String,
    check_in_time: DateTime<Utc>,
    check_out_time: Option<DateTime<Utc>>,
    is_active: bool,
}

impl From<GamingPatronRow> for GamingPatron {
    fn from(row: GamingPatronRow) -> Self {
        GamingPatron {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            is_active: row.is_active,
        }
    }
}

/// Repository for services and their tables, check-ins and patrons.
pub struct ServiceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Start a service in an area.
    ///
    /// The area is claimed with a conditional update on `active_service_id`,
    /// and the partial unique index on active services backs it up.
    pub async fn start(&self, venue_id: &str, area_id: &str, kind: ServiceType) -> Result<Service> {
        let id = Uuid::new_v4().to_string();
        let opened_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE areas SET active_service_id = ?
             WHERE id = ? AND venue_id = ? AND kind = ? AND active_service_id IS NULL",
        )
        .bind(&id)
        .bind(area_id)
        .bind(venue_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Err(if area_exists(&mut tx, venue_id, area_id, kind).await? {
                DoorlistError::AreaHasActiveService
            } else {
                DoorlistError::AreaNotFound
            });
        }

        sqlx::query(
            "INSERT INTO services (id, venue_id, area_id, kind, opened_at, is_active)
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(venue_id)
        .bind(area_id)
        .bind(kind.as_str())
        .bind(opened_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DoorlistError::AreaHasActiveService
            }
            other => other.into(),
        })?;

        tx.commit().await?;

        let detail = match kind {
            ServiceType::Dining => ServiceDetail::Dining { sittings: vec![] },
            ServiceType::Gaming => ServiceDetail::Gaming { patrons: vec![] },
        };
        Ok(Service {
            id,
            venue_id: venue_id.to_string(),
            area_id: area_id.to_string(),
            opened_at,
            closed_at: None,
            is_active: true,
            detail,
        })
    }

    /// Stop the active service in an area and release the area.
    pub async fn stop(&self, venue_id: &str, area_id: &str, kind: ServiceType) -> Result<Service> {
        let mut tx = self.pool.begin().await?;

        let stopped: Option<String> = sqlx::query_scalar(
            "UPDATE services SET is_active = 0, closed_at = ?
             WHERE venue_id = ? AND area_id = ? AND kind = ? AND is_active = 1
             RETURNING id",
        )
        .bind(Utc::now())
        .bind(venue_id)
        .bind(area_id)
        .bind(kind.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(service_id) = stopped else {
            return Err(if area_exists(&mut tx, venue_id, area_id, kind).await? {
                DoorlistError::AreaHasNoActiveService
            } else {
                DoorlistError::AreaNotFound
            });
        };

        sqlx::query("UPDATE areas SET active_service_id = NULL WHERE id = ? AND active_service_id = ?")
            .bind(area_id)
            .bind(&service_id)
            .execute(&mut *tx)
            .await?;

        let service = load_service(&mut tx, &service_id).await?;
        tx.commit().await?;
        service.ok_or(DoorlistError::ServiceNotFound)
    }

    /// Get a service with everything it holds.
    pub async fn get_by_id(&self, service_id: &str) -> Result<Option<Service>> {
        let mut tx = self.pool.begin().await?;
        let service = load_service(&mut tx, service_id).await?;
        tx.commit().await?;
        Ok(service)
    }

    /// Append a check-in to the active table with this number, opening the
    /// table first when there is none. Returns the table's ID.
    pub async fn add_dining_check_in(
        &self,
        service_id: &str,
        table_number: &str,
        check_in: &CheckIn,
    ) -> Result<String> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;

        let sitting_id = active_sitting_or_create(&mut tx, service_id, table_number).await?;

        sqlx::query("INSERT INTO check_ins (id, sitting_id, time) VALUES (?, ?, ?)")
            .bind(&check_in.id)
            .bind(&sitting_id)
            .bind(check_in.time)
            .execute(&mut *tx)
            .await?;

        for patron in &check_in.people {
            sqlx::query(
                "INSERT INTO dining_patrons (id, check_in_id, first_name, phone_number)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&patron.id)
            .bind(&check_in.id)
            .bind(&patron.first_name)
            .bind(&patron.phone_number)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(sitting_id)
    }

    /// Move one check-in to the active table with the given number.
    ///
    /// A source table left without check-ins is removed.
    pub async fn move_dining_group(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;
        locate_check_in(&mut tx, service_id, table_id, check_in_id).await?;

        let target_id = active_sitting_or_create(&mut tx, service_id, new_table_number).await?;
        if target_id == table_id {
            return Ok(());
        }

        sqlx::query("UPDATE check_ins SET sitting_id = ? WHERE id = ?")
            .bind(&target_id)
            .bind(check_in_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM sittings
             WHERE id = ? AND NOT EXISTS (SELECT 1 FROM check_ins WHERE sitting_id = ?)",
        )
        .bind(table_id)
        .bind(table_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Renumber a table, or merge it into the active table that already has
    /// the target number. A merged source table is deleted.
    pub async fn move_dining_table(
        &self,
        service_id: &str,
        table_id: &str,
        new_table_number: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT table_number FROM sittings WHERE id = ? AND service_id = ?")
                .bind(table_id)
                .bind(service_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Err(DoorlistError::TableNotFound);
        };
        if current == new_table_number {
            return Ok(());
        }

        let target: Option<String> = sqlx::query_scalar(
            "SELECT id FROM sittings
             WHERE service_id = ? AND table_number = ? AND is_active = 1 AND id != ?",
        )
        .bind(service_id)
        .bind(new_table_number)
        .bind(table_id)
        .fetch_optional(&mut *tx)
        .await?;

        match target {
            Some(target_id) => {
                sqlx::query("UPDATE check_ins SET sitting_id = ? WHERE sitting_id = ?")
                    .bind(&target_id)
                    .bind(table_id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("DELETE FROM sittings WHERE id = ?")
                    .bind(table_id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query("UPDATE sittings SET table_number = ? WHERE id = ?")
                    .bind(new_table_number)
                    .bind(table_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Mark a table inactive. Its check-ins stay in place.
    pub async fn close_dining_table(&self, service_id: &str, table_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;

        let result =
            sqlx::query("UPDATE sittings SET is_active = 0 WHERE id = ? AND service_id = ?")
                .bind(table_id)
                .bind(service_id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::TableNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a dining patron. A check-in left empty is deleted with it.
    pub async fn delete_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron_id: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;
        locate_check_in(&mut tx, service_id, table_id, check_in_id).await?;

        let result = sqlx::query("DELETE FROM dining_patrons WHERE id = ? AND check_in_id = ?")
            .bind(patron_id)
            .bind(check_in_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::PatronNotFound);
        }

        sqlx::query(
            "DELETE FROM check_ins
             WHERE id = ? AND NOT EXISTS (SELECT 1 FROM dining_patrons WHERE check_in_id = ?)",
        )
        .bind(check_in_id)
        .bind(check_in_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persist a dining patron's name and phone number.
    pub async fn update_dining_patron(
        &self,
        service_id: &str,
        table_id: &str,
        check_in_id: &str,
        patron: &DiningPatron,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Dining).await?;
        locate_check_in(&mut tx, service_id, table_id, check_in_id).await?;

        let result = sqlx::query(
            "UPDATE dining_patrons SET first_name = ?, phone_number = ?
             WHERE id = ? AND check_in_id = ?",
        )
        .bind(&patron.first_name)
        .bind(&patron.phone_number)
        .bind(&patron.id)
        .bind(check_in_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::PatronNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Append a gaming patron.
    pub async fn add_gaming_patron(&self, service_id: &str, patron: &GamingPatron) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Gaming).await?;

        sqlx::query(
            "INSERT INTO gaming_patrons
                (id, service_id, first_name, last_name, phone_number,
                 check_in_time, check_out_time, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&patron.id)
        .bind(service_id)
        .bind(&patron.first_name)
        .bind(&patron.last_name)
        .bind(&patron.phone_number)
        .bind(patron.check_in_time)
        .bind(patron.check_out_time)
        .bind(patron.is_active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a gaming patron.
    pub async fn delete_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Gaming).await?;

        let result = sqlx::query("DELETE FROM gaming_patrons WHERE id = ? AND service_id = ?")
            .bind(patron_id)
            .bind(service_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::PatronNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Apply the present fields of an update to a gaming patron.
    pub async fn update_gaming_patron(
        &self,
        service_id: &str,
        patron_id: &str,
        update: &GamingPatronUpdate,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Gaming).await?;

        let result = sqlx::query(
            "UPDATE gaming_patrons SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone_number = COALESCE(?, phone_number)
             WHERE id = ? AND service_id = ?",
        )
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.phone_number.as_deref())
        .bind(patron_id)
        .bind(service_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::PatronNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Check a gaming patron out, keeping the first check-out time.
    pub async fn check_out_gaming_patron(&self, service_id: &str, patron_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_active_service(&mut tx, service_id, ServiceType::Gaming).await?;

        let result = sqlx::query(
            "UPDATE gaming_patrons SET check_out_time = COALESCE(check_out_time, ?), is_active = 0
             WHERE id = ? AND service_id = ?",
        )
        .bind(Utc::now())
        .bind(patron_id)
        .bind(service_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DoorlistError::PatronNotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn area_exists(
    conn: &mut SqliteConnection,
    venue_id: &str,
    area_id: &str,
    kind: ServiceType,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM areas WHERE id = ? AND venue_id = ? AND kind = ?)",
    )
    .bind(area_id)
    .bind(venue_id)
    .bind(kind.as_str())
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

async fn ensure_active_service(
    conn: &mut SqliteConnection,
    service_id: &str,
    kind: ServiceType,
) -> Result<()> {
    let is_active: Option<bool> =
        sqlx::query_scalar("SELECT is_active FROM services WHERE id = ? AND kind = ?")
            .bind(service_id)
            .bind(kind.as_str())
            .fetch_optional(conn)
            .await?;
    match is_active {
        None => Err(DoorlistError::ServiceNotFound),
        Some(false) => Err(DoorlistError::ServiceIsNotActive),
        Some(true) => Ok(()),
    }
}

/// Check that the table belongs to the service and the check-in to the table.
async fn locate_check_in(
    conn: &mut SqliteConnection,
    service_id: &str,
    table_id: &str,
    check_in_id: &str,
) -> Result<()> {
    let table_found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sittings WHERE id = ? AND service_id = ?)")
            .bind(table_id)
            .bind(service_id)
            .fetch_one(&mut *conn)
            .await?;
    if !table_found {
        return Err(DoorlistError::TableNotFound);
    }

    let check_in_found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM check_ins WHERE id = ? AND sitting_id = ?)")
            .bind(check_in_id)
            .bind(table_id)
            .fetch_one(&mut *conn)
            .await?;
    if !check_in_found {
        return Err(DoorlistError::CheckInNotFound);
    }
    Ok(())
}

async fn active_sitting_or_create(
    conn: &mut SqliteConnection,
    service_id: &str,
    table_number: &str,
) -> Result<String> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT id FROM sittings WHERE service_id = ? AND table_number = ? AND is_active = 1",
    )
    .bind(service_id)
    .bind(table_number)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sittings (id, service_id, table_number, created_at, is_active)
         VALUES (?, ?, ?, ?, 1)",
    )
    .bind(&id)
    .bind(service_id)
    .bind(table_number)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

async fn load_service(conn: &mut SqliteConnection, service_id: &str) -> Result<Option<Service>> {
    let row = sqlx::query_as::<_, ServiceRow>(
        "SELECT id, venue_id, area_id, kind, opened_at, closed_at, is_active
         FROM services WHERE id = ?",
    )
    .bind(service_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let kind: ServiceType = row.kind.parse().map_err(DoorlistError::Database)?;
    let detail = match kind {
        ServiceType::Dining => ServiceDetail::Dining {
            sittings: load_sittings(conn, service_id).await?,
        },
        ServiceType::Gaming => {
            let rows = sqlx::query_as::<_, GamingPatronRow>(
                "SELECT id, first_name, last_name, phone_number, check_in_time,
                        check_out_time, is_active
                 FROM gaming_patrons WHERE service_id = ? ORDER BY rowid",
            )
            .bind(service_id)
            .fetch_all(&mut *conn)
            .await?;
            ServiceDetail::Gaming {
                patrons: rows.into_iter().map(GamingPatron::from).collect(),
            }
        }
    };

    Ok(Some(Service {
        id: row.id,
        venue_id: row.venue_id,
        area_id: row.area_id,
        opened_at: row.opened_at,
        closed_at: row.closed_at,
        is_active: row.is_active,
        detail,
    }))
}

async fn load_sittings(conn: &mut SqliteConnection, service_id: &str) -> Result<Vec<Sitting>> {
    let sittings = sqlx::query_as::<_, SittingRow>(
        "SELECT id, table_number, created_at, is_active
         FROM sittings WHERE service_id = ? ORDER BY rowid",
    )
    .bind(service_id)
    .fetch_all(&mut *conn)
    .await?;

    let check_ins = sqlx::query_as::<_, CheckInRow>(
        "SELECT c.id, c.sitting_id, c.time
         FROM check_ins c JOIN sittings s ON s.id = c.sitting_id
         WHERE s.service_id = ? ORDER BY c.rowid",
    )
    .bind(service_id)
    .fetch_all(&mut *conn)
    .await?;

    let patrons = sqlx::query_as::<_, DiningPatronRow>(
        "SELECT p.id, p.check_in_id, p.first_name, p.phone_number
         FROM dining_patrons p
         JOIN check_ins c ON c.id = p.check_in_id
         JOIN sittings s ON s.id = c.sitting_id
         WHERE s.service_id = ? ORDER BY p.rowid",
    )
    .bind(service_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut people: HashMap<String, Vec<DiningPatron>> = HashMap::new();
    for p in patrons {
        people.entry(p.check_in_id).or_default().push(DiningPatron {
            id: p.id,
            first_name: p.first_name,
            phone_number: p.phone_number,
        });
    }

    let mut by_sitting: HashMap<String, Vec<CheckIn>> = HashMap::new();
    for c in check_ins {
        let people = people.remove(&c.id).unwrap_or_default();
        by_sitting.entry(c.sitting_id).or_default().push(CheckIn {
            id: c.id,
            time: c.time,
            people,
        });
    }

    Ok(sittings
        .into_iter()
        .map(|s| Sitting {
            check_ins: by_sitting.remove(&s.id).unwrap_or_default(),
            id: s.id,
            table_number: s.table_number,
            created_at: s.created_at,
            is_active: s.is_active,
        })
        .collect())
}
