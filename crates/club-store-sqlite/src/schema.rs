//! SQL schema for the club SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Version stamped into `PRAGMA user_version` by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
///
/// There are deliberately no `REFERENCES` clauses: deleting a sport or member
/// leaves its subscriptions in place.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS sports (
    sport_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    category    TEXT NOT NULL,
    max_members INTEGER CHECK (max_members IS NULL OR max_members > 0),
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS members (
    member_id       TEXT PRIMARY KEY,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    email           TEXT NOT NULL,
    phone           TEXT NOT NULL,
    date_of_birth   TEXT NOT NULL,   -- YYYY-MM-DD
    address         TEXT NOT NULL,
    membership_date TEXT NOT NULL,   -- YYYY-MM-DD
    status          TEXT NOT NULL,   -- 'active' | 'inactive'
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- One row per (member, sport) pair regardless of status; a cancelled row is
-- reactivated in place rather than duplicated.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id   TEXT PRIMARY KEY,
    member_id         TEXT NOT NULL,
    sport_id          TEXT NOT NULL,
    subscription_date TEXT NOT NULL,
    status            TEXT NOT NULL,   -- 'active' | 'cancelled'
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS members_email_idx      ON members(email);
CREATE INDEX        IF NOT EXISTS members_status_idx     ON members(status);
CREATE INDEX        IF NOT EXISTS sports_category_idx    ON sports(category);
CREATE INDEX        IF NOT EXISTS subscriptions_member_idx ON subscriptions(member_id);
CREATE INDEX        IF NOT EXISTS subscriptions_sport_idx  ON subscriptions(sport_id);
CREATE UNIQUE INDEX IF NOT EXISTS subscriptions_pair_idx
    ON subscriptions(member_id, sport_id);

PRAGMA user_version = 1;
";
