//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings and statuses as their
//! lowercase names.

use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDate, Utc};
use club_core::{
  member::{Member, MemberStatus},
  sport::Sport,
  subscription::{Subscription, SubscriptionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── max_members ──────────────────────────────────────────────────────────────

pub fn encode_max_members(m: Option<NonZeroU32>) -> Option<i64> {
  m.map(|n| i64::from(n.get()))
}

pub fn decode_max_members(v: Option<i64>) -> Result<Option<NonZeroU32>> {
  v.map(|n| {
    u32::try_from(n)
      .ok()
      .and_then(NonZeroU32::new)
      .ok_or_else(|| Error::InvalidColumn {
        column: "max_members",
        value:  n.to_string(),
      })
  })
  .transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSport::from_row`], prefixed with `sp.`.
pub const SPORT_COLUMNS: &str = "sp.sport_id, sp.name, sp.description, \
  sp.category, sp.max_members, sp.created_at, sp.updated_at";

/// Raw values read directly from a `sports` row.
pub struct RawSport {
  pub sport_id:    String,
  pub name:        String,
  pub description: String,
  pub category:    String,
  pub max_members: Option<i64>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawSport {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sport_id:    row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      category:    row.get(3)?,
      max_members: row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_sport(self) -> Result<Sport> {
    Ok(Sport {
      sport_id:    decode_uuid(&self.sport_id)?,
      name:        self.name,
      description: self.description,
      category:    self.category,
      max_members: decode_max_members(self.max_members)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawMember::from_row`], prefixed with `m.`.
pub const MEMBER_COLUMNS: &str = "m.member_id, m.first_name, m.last_name, \
  m.email, m.phone, m.date_of_birth, m.address, m.membership_date, m.status, \
  m.created_at, m.updated_at";

/// Raw strings read directly from a `members` row.
pub struct RawMember {
  pub member_id:       String,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  pub phone:           String,
  pub date_of_birth:   String,
  pub address:         String,
  pub membership_date: String,
  pub status:          String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawMember {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      member_id:       row.get(0)?,
      first_name:      row.get(1)?,
      last_name:       row.get(2)?,
      email:           row.get(3)?,
      phone:           row.get(4)?,
      date_of_birth:   row.get(5)?,
      address:         row.get(6)?,
      membership_date: row.get(7)?,
      status:          row.get(8)?,
      created_at:      row.get(9)?,
      updated_at:      row.get(10)?,
    })
  }

  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      member_id:       decode_uuid(&self.member_id)?,
      first_name:      self.first_name,
      last_name:       self.last_name,
      email:           self.email,
      phone:           self.phone,
      date_of_birth:   decode_date(&self.date_of_birth)?,
      address:         self.address,
      membership_date: decode_date(&self.membership_date)?,
      status:          self.status.parse::<MemberStatus>()?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawSubscription::from_row`], prefixed with `sub.`.
pub const SUBSCRIPTION_COLUMNS: &str = "sub.subscription_id, sub.member_id, \
  sub.sport_id, sub.subscription_date, sub.status, sub.created_at, \
  sub.updated_at";

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub subscription_id:   String,
  pub member_id:         String,
  pub sport_id:          String,
  pub subscription_date: String,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subscription_id:   row.get(0)?,
      member_id:         row.get(1)?,
      sport_id:          row.get(2)?,
      subscription_date: row.get(3)?,
      status:            row.get(4)?,
      created_at:        row.get(5)?,
      updated_at:        row.get(6)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      subscription_id:   decode_uuid(&self.subscription_id)?,
      member_id:         decode_uuid(&self.member_id)?,
      sport_id:          decode_uuid(&self.sport_id)?,
      subscription_date: decode_dt(&self.subscription_date)?,
      status:            self.status.parse::<SubscriptionStatus>()?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}
