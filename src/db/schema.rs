//! Database schema and migrations for Doorlist.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Venues and their areas
    r#"
CREATE TABLE venues (
    id          TEXT PRIMARY KEY,
    url_name    TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE areas (
    id                  TEXT PRIMARY KEY,
    venue_id            TEXT NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    kind                TEXT NOT NULL,       -- 'DINING' or 'GAMING'
    short_name          TEXT NOT NULL,
    name                TEXT NOT NULL,
    is_open             INTEGER NOT NULL DEFAULT 1,
    active_service_id   TEXT,                -- NULL when no service is running
    sort_order          INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_areas_venue_id ON areas(venue_id);
"#,
    // v2: Managers, venue grants and sessions
    r#"
CREATE TABLE managers (
    id                  TEXT PRIMARY KEY,
    first_name          TEXT NOT NULL DEFAULT '',
    last_name           TEXT NOT NULL DEFAULT '',
    email               TEXT NOT NULL DEFAULT '',
    username            TEXT NOT NULL UNIQUE,
    password_hash       TEXT NOT NULL,       -- PBKDF2 hash, or reset password while flagged
    salt                TEXT NOT NULL DEFAULT '',
    is_password_reset   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE manager_venues (
    manager_id  TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
    venue_id    TEXT NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    PRIMARY KEY (manager_id, venue_id)
);

CREATE TABLE sessions (
    id              TEXT PRIMARY KEY,
    session_id      TEXT NOT NULL UNIQUE,   -- opaque token
    manager_id      TEXT NOT NULL REFERENCES managers(id) ON DELETE CASCADE,
    ip_address      TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    access_level    TEXT NOT NULL,          -- 'FULL' or 'RESET'
    is_active       INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_sessions_manager_id ON sessions(manager_id);
"#,
    // v3: Services, tables, check-ins and patrons
    r#"
CREATE TABLE services (
    id          TEXT PRIMARY KEY,
    venue_id    TEXT NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
    area_id     TEXT NOT NULL REFERENCES areas(id) ON DELETE CASCADE,
    kind        TEXT NOT NULL,
    opened_at   TEXT NOT NULL,
    closed_at   TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1
);

-- At most one active service per area
CREATE UNIQUE INDEX idx_services_active_area ON services(area_id) WHERE is_active = 1;
CREATE INDEX idx_services_venue_id ON services(venue_id);

CREATE TABLE sittings (
    id              TEXT PRIMARY KEY,
    service_id      TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
    table_number    TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1
);

-- At most one active table per number within a service
CREATE UNIQUE INDEX idx_sittings_active_table
    ON sittings(service_id, table_number) WHERE is_active = 1;

CREATE TABLE check_ins (
    id          TEXT PRIMARY KEY,
    sitting_id  TEXT NOT NULL REFERENCES sittings(id) ON DELETE CASCADE,
    time        TEXT NOT NULL
);

CREATE INDEX idx_check_ins_sitting_id ON check_ins(sitting_id);

CREATE TABLE dining_patrons (
    id              TEXT PRIMARY KEY,
    check_in_id     TEXT NOT NULL REFERENCES check_ins(id) ON DELETE CASCADE,
    first_name      TEXT NOT NULL,
    phone_number    TEXT NOT NULL
);

CREATE INDEX idx_dining_patrons_check_in_id ON dining_patrons(check_in_id);

CREATE TABLE gaming_patrons (
    id              TEXT PRIMARY KEY,
    service_id      TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    phone_number    TEXT NOT NULL,
    check_in_time   TEXT NOT NULL,
    check_out_time  TEXT,                   -- NULL until checked out
    is_active       INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_gaming_patrons_service_id ON gaming_patrons(service_id);
"#,
];
