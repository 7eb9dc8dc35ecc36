//! Manager session model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DbPool;
use crate::{DoorlistError, Result};

/// Access level carried by a session, fixed when the session is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// Full manager privileges.
    Full,
    /// Password rotation only.
    Reset,
}

impl AccessLevel {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Full => "FULL",
            AccessLevel::Reset => "RESET",
        }
    }

    /// Access level a manager is granted at login.
    pub fn for_password_reset(is_password_reset: bool) -> Self {
        if is_password_reset {
            AccessLevel::Reset
        } else {
            AccessLevel::Full
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FULL" => Ok(AccessLevel::Full),
            "RESET" => Ok(AccessLevel::Reset),
            _ => Err(format!("unknown access level: {s}")),
        }
    }
}

/// A manager login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Record ID.
    pub id: String,
    /// Opaque session token handed to the client.
    pub session_id: String,
    /// Owning manager.
    pub manager_id: String,
    /// Client IP at login.
    pub ip_address: String,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Access level, fixed at issuance.
    pub access_level: AccessLevel,
    /// False once logged out or invalidated by a password change.
    pub is_active: bool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    session_id: String,
    manager_id: String,
    ip_address: String,
    created_at: DateTime<Utc>,
    access_level: String,
    is_active: bool,
}

impl TryFrom<SessionRow> for Session {
    type Error = DoorlistError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            id: row.id,
            session_id: row.session_id,
            manager_id: row.manager_id,
            ip_address: row.ip_address,
            created_at: row.created_at,
            access_level: row.access_level.parse().map_err(DoorlistError::Database)?,
            is_active: row.is_active,
        })
    }
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a session unless its token is already taken.
    ///
    /// The unique index on `session_id` makes the existence check and the
    /// insert a single atomic statement.
    pub async fn insert_if_absent(&self, session: &Session) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO sessions
                (id, session_id, manager_id, ip_address, created_at, access_level, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (session_id) DO NOTHING",
        )
        .bind(&session.id)
        .bind(&session.session_id)
        .bind(&session.manager_id)
        .bind(&session.ip_address)
        .bind(session.created_at)
        .bind(session.access_level.as_str())
        .bind(session.is_active)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Get a session by its token.
    pub async fn get_by_token(&self, session_id: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, session_id, manager_id, ip_address, created_at, access_level, is_active
             FROM sessions WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;
        row.map(Session::try_from).transpose()
    }

    /// List every session a manager has held, oldest first.
    pub async fn list_for_manager(&self, manager_id: &str) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, session_id, manager_id, ip_address, created_at, access_level, is_active
             FROM sessions WHERE manager_id = ? ORDER BY created_at, rowid",
        )
        .bind(manager_id)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Session::try_from).collect()
    }

    /// Deactivate one session.
    pub async fn deactivate(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET is_active = 0 WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
