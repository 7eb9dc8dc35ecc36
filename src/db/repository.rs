//! Manager repository.

use uuid::Uuid;

use super::{DbPool, Manager, NewManager};
use crate::Result;

#[derive(sqlx::FromRow)]
struct ManagerRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    username: String,
    password_hash: String,
    salt: String,
    is_password_reset: bool,
}

impl ManagerRow {
    fn into_manager(self, venue_ids: Vec<String>) -> Manager {
        Manager {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            salt: self.salt,
            is_password_reset: self.is_password_reset,
            venue_ids,
        }
    }
}

const MANAGER_COLUMNS: &str =
    "id, first_name, last_name, email, username, password_hash, salt, is_password_reset";

/// Repository for manager operations.
pub struct ManagerRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ManagerRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new manager.
    pub async fn create(&self, new_manager: &NewManager) -> Result<Manager> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO managers
                (id, first_name, last_name, email, username, password_hash, salt, is_password_reset)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new_manager.first_name)
        .bind(&new_manager.last_name)
        .bind(&new_manager.email)
        .bind(&new_manager.username)
        .bind(&new_manager.password_hash)
        .bind(&new_manager.salt)
        .bind(new_manager.is_password_reset)
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or(crate::DoorlistError::ManagerNotFound)
    }

    /// Get a manager by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Manager>> {
        let sql = format!("SELECT {MANAGER_COLUMNS} FROM managers WHERE id = ?");
        let row = sqlx::query_as::<_, ManagerRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        self.attach_venues(row).await
    }

    /// Get a manager by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Manager>> {
        let sql = format!("SELECT {MANAGER_COLUMNS} FROM managers WHERE username = ?");
        let row = sqlx::query_as::<_, ManagerRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        self.attach_venues(row).await
    }

    async fn attach_venues(&self, row: Option<ManagerRow>) -> Result<Option<Manager>> {
        match row {
            Some(row) => {
                let venue_ids = self.venue_ids(&row.id).await?;
                Ok(Some(row.into_manager(venue_ids)))
            }
            None => Ok(None),
        }
    }

    /// Store a new password hash and salt, clear the reset flag and
    /// deactivate every session of the manager in one transaction.
    ///
    /// Returns the number of sessions deactivated, or `None` when the manager
    /// does not exist. Nothing is written unless both updates succeed.
    pub async fn rotate_password(
        &self,
        id: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE managers SET password_hash = ?, salt = ?, is_password_reset = 0 WHERE id = ?",
        )
        .bind(password_hash)
        .bind(salt)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let invalidated = sqlx::query(
            "UPDATE sessions SET is_active = 0 WHERE manager_id = ? AND is_active = 1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(invalidated.rows_affected()))
    }

    /// Flag a manager for password rotation with a one-time reset password.
    pub async fn set_reset_password(&self, id: &str, reset_password: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE managers SET password_hash = ?, salt = '', is_password_reset = 1 WHERE id = ?",
        )
        .bind(reset_password)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a manager to a venue.
    pub async fn grant_venue(&self, manager_id: &str, venue_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO manager_venues (manager_id, venue_id) VALUES (?, ?)
             ON CONFLICT (manager_id, venue_id) DO NOTHING",
        )
        .bind(manager_id)
        .bind(venue_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// IDs of the venues a manager is attached to.
    pub async fn venue_ids(&self, manager_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT venue_id FROM manager_venues WHERE manager_id = ? ORDER BY rowid",
        )
        .bind(manager_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Whether the manager is attached to the venue.
    pub async fn has_venue(&self, manager_id: &str, venue_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM manager_venues WHERE manager_id = ? AND venue_id = ?)",
        )
        .bind(manager_id)
        .bind(venue_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether the manager is attached to the venue a service runs in.
    pub async fn has_service(&self, manager_id: &str, service_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM services s
                JOIN manager_venues mv ON mv.venue_id = s.venue_id
                WHERE s.id = ? AND mv.manager_id = ?
             )",
        )
        .bind(service_id)
        .bind(manager_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}
