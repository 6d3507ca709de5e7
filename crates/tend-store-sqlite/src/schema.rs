//! SQL schema for the tend SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS caregivers (
    caregiver_id  TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS houses (
    house_id      TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    acuity_weight INTEGER NOT NULL,
    high_acuity   INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recipients (
    recipient_id  TEXT PRIMARY KEY,
    house_id      TEXT NOT NULL REFERENCES houses(house_id),
    display_name  TEXT NOT NULL,
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

-- One row per regeneration. At most one row has is_current = 1.
CREATE TABLE IF NOT EXISTS versions (
    version      INTEGER PRIMARY KEY,
    created_at   TEXT NOT NULL,
    valid_from   TEXT NOT NULL,   -- ISO 8601 date
    valid_until  TEXT NOT NULL,
    is_current   INTEGER NOT NULL DEFAULT 0
);

-- Caregiver placements are append-only.
-- Rows are retired by flipping is_current, never deleted; the only other
-- permitted UPDATE is setting absent_on.
CREATE TABLE IF NOT EXISTS schedule_assignments (
    assignment_id TEXT PRIMARY KEY,
    caregiver_id  TEXT NOT NULL REFERENCES caregivers(caregiver_id),
    house_id      TEXT NOT NULL REFERENCES houses(house_id),
    shift         TEXT NOT NULL,   -- 'first' | 'second' | 'night'
    work_days     TEXT NOT NULL,   -- JSON-encoded day pattern
    version       INTEGER NOT NULL REFERENCES versions(version),
    valid_from    TEXT NOT NULL,
    valid_until   TEXT NOT NULL,
    is_current    INTEGER NOT NULL DEFAULT 0,
    absent_on     TEXT             -- ISO 8601 date or NULL
);

-- Base recipient-to-caregiver rows; retired by status flip, never deleted.
CREATE TABLE IF NOT EXISTS recipient_assignments (
    id            TEXT PRIMARY KEY,
    caregiver_id  TEXT NOT NULL REFERENCES caregivers(caregiver_id),
    recipient_id  TEXT NOT NULL REFERENCES recipients(recipient_id),
    weekday       TEXT NOT NULL,   -- 'mon'..'sun'
    shift         TEXT NOT NULL,
    version       INTEGER NOT NULL REFERENCES versions(version),
    cross_shift   INTEGER NOT NULL DEFAULT 0,
    status        TEXT NOT NULL DEFAULT 'active'
);

-- Date-scoped overrides; cleared rows are flagged revoked, never deleted.
CREATE TABLE IF NOT EXISTS reassignments (
    id            TEXT PRIMARY KEY,
    recipient_id  TEXT NOT NULL REFERENCES recipients(recipient_id),
    origin        TEXT NOT NULL,   -- JSON-encoded origin
    to_caregiver  TEXT NOT NULL REFERENCES caregivers(caregiver_id),
    date          TEXT NOT NULL,
    version       INTEGER NOT NULL REFERENCES versions(version),
    reason        TEXT NOT NULL,   -- 'absence' | 'emergency_cover' | 'emergency_backfill'
    revoked       INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activity_log (
    event_id  TEXT PRIMARY KEY,
    at        TEXT NOT NULL,
    operator  TEXT NOT NULL,
    kind      TEXT NOT NULL,
    summary   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS recipients_house_idx        ON recipients(house_id);
CREATE INDEX IF NOT EXISTS assignments_version_idx     ON schedule_assignments(version);
CREATE INDEX IF NOT EXISTS assignments_caregiver_idx   ON schedule_assignments(caregiver_id);
CREATE INDEX IF NOT EXISTS recipient_rows_version_idx  ON recipient_assignments(version);
CREATE INDEX IF NOT EXISTS reassignments_date_idx      ON reassignments(date);
CREATE INDEX IF NOT EXISTS activity_at_idx             ON activity_log(at);

PRAGMA user_version = 1;
";
