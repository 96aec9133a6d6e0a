//! Synchronous statement bodies executed on the connection thread.
//!
//! Each public function here is one store operation. Those that read before
//! writing open an IMMEDIATE transaction, so the write lock is held from the
//! first check onwards, and only commit once every check has passed. An early
//! `return Err(..)` rolls the whole operation back.

use chrono::{DateTime, Utc};
use club_core::{
  Error as CoreError,
  member::{Member, MemberPatch, MemberStatus},
  sport::{Sport, SportPatch},
  subscription::{Subscription, SubscriptionStatus},
  view::{MemberWithSports, SportWithMembers},
};
use rusqlite::{
  Connection, ErrorCode, OptionalExtension as _, Transaction,
  TransactionBehavior, params,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    MEMBER_COLUMNS, RawMember, RawSport, RawSubscription, SPORT_COLUMNS,
    SUBSCRIPTION_COLUMNS, decode_uuid, encode_date, encode_dt,
    encode_max_members, encode_uuid,
  },
};

// ─── Transactions ────────────────────────────────────────────────────────────

/// Begin a write transaction that takes the database lock up front. Competing
/// writers then wait out the busy timeout instead of failing a lock upgrade.
fn begin_write(conn: &mut Connection) -> Result<Transaction<'_>> {
  Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Map a UNIQUE violation mentioning `column` to `conflict`; any other error
/// passes through.
pub fn unique_as(
  column: &'static str,
  conflict: CoreError,
) -> impl FnOnce(rusqlite::Error) -> crate::Error {
  move |e| {
    let is_unique = matches!(
      &e,
      rusqlite::Error::SqliteFailure(err, Some(msg))
        if err.code == ErrorCode::ConstraintViolation
          && msg.starts_with("UNIQUE")
          && msg.contains(column)
    );
    if is_unique { conflict.into() } else { e.into() }
  }
}

// ─── Generic readers ─────────────────────────────────────────────────────────

fn query_sports<P: rusqlite::Params>(
  conn: &Connection,
  sql: &str,
  params: P,
) -> Result<Vec<Sport>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(params, RawSport::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawSport::into_sport).collect()
}

fn query_members<P: rusqlite::Params>(
  conn: &Connection,
  sql: &str,
  params: P,
) -> Result<Vec<Member>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(params, RawMember::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawMember::into_member).collect()
}

fn query_subscriptions<P: rusqlite::Params>(
  conn: &Connection,
  sql: &str,
  params: P,
) -> Result<Vec<Subscription>> {
  let mut stmt = conn.prepare(sql)?;
  let raws = stmt
    .query_map(params, RawSubscription::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawSubscription::into_subscription).collect()
}

// ─── Sports ──────────────────────────────────────────────────────────────────

pub fn insert_sport(conn: &Connection, sport: &Sport) -> Result<()> {
  conn.execute(
    "INSERT INTO sports (
       sport_id, name, description, category, max_members,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(sport.sport_id),
      sport.name,
      sport.description,
      sport.category,
      encode_max_members(sport.max_members),
      encode_dt(sport.created_at),
      encode_dt(sport.updated_at),
    ],
  )?;
  Ok(())
}

pub fn select_sport(conn: &Connection, id: Uuid) -> Result<Option<Sport>> {
  conn
    .query_row(
      &format!("SELECT {SPORT_COLUMNS} FROM sports sp WHERE sp.sport_id = ?1"),
      params![encode_uuid(id)],
      RawSport::from_row,
    )
    .optional()?
    .map(RawSport::into_sport)
    .transpose()
}

pub fn select_all_sports(conn: &Connection) -> Result<Vec<Sport>> {
  query_sports(
    conn,
    &format!("SELECT {SPORT_COLUMNS} FROM sports sp ORDER BY sp.rowid"),
    [],
  )
}

pub fn select_sports_by_category(
  conn: &Connection,
  category: &str,
) -> Result<Vec<Sport>> {
  query_sports(
    conn,
    &format!(
      "SELECT {SPORT_COLUMNS} FROM sports sp
       WHERE sp.category = ?1
       ORDER BY sp.rowid"
    ),
    params![category],
  )
}

pub fn update_sport(
  conn: &mut Connection,
  id: Uuid,
  patch: SportPatch,
  now: DateTime<Utc>,
) -> Result<Sport> {
  let tx = begin_write(conn)?;

  let mut sport =
    select_sport(&tx, id)?.ok_or(CoreError::SportNotFound(id))?;
  sport.apply(patch, now);

  tx.execute(
    "UPDATE sports
     SET name = ?2, description = ?3, category = ?4, max_members = ?5,
         updated_at = ?6
     WHERE sport_id = ?1",
    params![
      encode_uuid(id),
      sport.name,
      sport.description,
      sport.category,
      encode_max_members(sport.max_members),
      encode_dt(sport.updated_at),
    ],
  )?;

  tx.commit()?;
  Ok(sport)
}

pub fn delete_sport(conn: &Connection, id: Uuid) -> Result<bool> {
  let removed = conn.execute(
    "DELETE FROM sports WHERE sport_id = ?1",
    params![encode_uuid(id)],
  )?;
  Ok(removed > 0)
}

/// Insert `sports` only if the table is empty. Returns how many were written.
pub fn seed_sports(conn: &mut Connection, sports: &[Sport]) -> Result<usize> {
  let tx = begin_write(conn)?;

  let existing: i64 =
    tx.query_row("SELECT COUNT(*) FROM sports", [], |r| r.get(0))?;
  if existing > 0 {
    return Ok(0);
  }

  for sport in sports {
    insert_sport(&tx, sport)?;
  }

  tx.commit()?;
  Ok(sports.len())
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// The id of the member currently holding `email`, if any.
fn email_owner(conn: &Connection, email: &str) -> Result<Option<Uuid>> {
  let owner: Option<String> = conn
    .query_row(
      "SELECT member_id FROM members WHERE email = ?1",
      params![email],
      |r| r.get(0),
    )
    .optional()?;
  owner.as_deref().map(decode_uuid).transpose()
}

pub fn insert_member(conn: &mut Connection, member: &Member) -> Result<()> {
  let tx = begin_write(conn)?;

  if email_owner(&tx, &member.email)?.is_some() {
    return Err(CoreError::DuplicateEmail(member.email.clone()).into());
  }

  tx.execute(
    "INSERT INTO members (
       member_id, first_name, last_name, email, phone, date_of_birth,
       address, membership_date, status, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      encode_uuid(member.member_id),
      member.first_name,
      member.last_name,
      member.email,
      member.phone,
      encode_date(member.date_of_birth),
      member.address,
      encode_date(member.membership_date),
      member.status.as_str(),
      encode_dt(member.created_at),
      encode_dt(member.updated_at),
    ],
  )
  .map_err(unique_as(
    "members.email",
    CoreError::DuplicateEmail(member.email.clone()),
  ))?;

  tx.commit()?;
  Ok(())
}

pub fn select_member(conn: &Connection, id: Uuid) -> Result<Option<Member>> {
  conn
    .query_row(
      &format!("SELECT {MEMBER_COLUMNS} FROM members m WHERE m.member_id = ?1"),
      params![encode_uuid(id)],
      RawMember::from_row,
    )
    .optional()?
    .map(RawMember::into_member)
    .transpose()
}

pub fn select_member_by_email(
  conn: &Connection,
  email: &str,
) -> Result<Option<Member>> {
  conn
    .query_row(
      &format!("SELECT {MEMBER_COLUMNS} FROM members m WHERE m.email = ?1"),
      params![email],
      RawMember::from_row,
    )
    .optional()?
    .map(RawMember::into_member)
    .transpose()
}

pub fn select_all_members(conn: &Connection) -> Result<Vec<Member>> {
  query_members(
    conn,
    &format!("SELECT {MEMBER_COLUMNS} FROM members m ORDER BY m.rowid"),
    [],
  )
}

pub fn select_members_by_status(
  conn: &Connection,
  status: MemberStatus,
) -> Result<Vec<Member>> {
  query_members(
    conn,
    &format!(
      "SELECT {MEMBER_COLUMNS} FROM members m
       WHERE m.status = ?1
       ORDER BY m.rowid"
    ),
    params![status.as_str()],
  )
}

pub fn update_member(
  conn: &mut Connection,
  id: Uuid,
  patch: MemberPatch,
  now: DateTime<Utc>,
) -> Result<Member> {
  let tx = begin_write(conn)?;

  let mut member =
    select_member(&tx, id)?.ok_or(CoreError::MemberNotFound(id))?;

  if let Some(email) = &patch.email
    && email_owner(&tx, email)?.is_some_and(|owner| owner != id)
  {
    return Err(CoreError::DuplicateEmail(email.clone()).into());
  }

  member.apply(patch, now);

  tx.execute(
    "UPDATE members
     SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5,
         date_of_birth = ?6, address = ?7, membership_date = ?8,
         status = ?9, updated_at = ?10
     WHERE member_id = ?1",
    params![
      encode_uuid(id),
      member.first_name,
      member.last_name,
      member.email,
      member.phone,
      encode_date(member.date_of_birth),
      member.address,
      encode_date(member.membership_date),
      member.status.as_str(),
      encode_dt(member.updated_at),
    ],
  )
  .map_err(unique_as(
    "members.email",
    CoreError::DuplicateEmail(member.email.clone()),
  ))?;

  tx.commit()?;
  Ok(member)
}

pub fn delete_member(conn: &Connection, id: Uuid) -> Result<bool> {
  let removed = conn.execute(
    "DELETE FROM members WHERE member_id = ?1",
    params![encode_uuid(id)],
  )?;
  Ok(removed > 0)
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(sql, params![encode_uuid(id)], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn write_subscription_state(
  conn: &Connection,
  sub: &Subscription,
) -> Result<()> {
  conn.execute(
    "UPDATE subscriptions
     SET status = ?2, subscription_date = ?3, updated_at = ?4
     WHERE subscription_id = ?1",
    params![
      encode_uuid(sub.subscription_id),
      sub.status.as_str(),
      encode_dt(sub.subscription_date),
      encode_dt(sub.updated_at),
    ],
  )?;
  Ok(())
}

pub fn select_subscription(
  conn: &Connection,
  member_id: Uuid,
  sport_id: Uuid,
) -> Result<Option<Subscription>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions sub
         WHERE sub.member_id = ?1 AND sub.sport_id = ?2"
      ),
      params![encode_uuid(member_id), encode_uuid(sport_id)],
      RawSubscription::from_row,
    )
    .optional()?
    .map(RawSubscription::into_subscription)
    .transpose()
}

/// Check-and-set for a (member, sport) pair, run as one transaction.
pub fn subscribe(
  conn: &mut Connection,
  member_id: Uuid,
  sport_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Subscription> {
  let tx = begin_write(conn)?;

  if !row_exists(&tx, "SELECT 1 FROM members WHERE member_id = ?1", member_id)? {
    return Err(CoreError::MemberNotFound(member_id).into());
  }
  if !row_exists(&tx, "SELECT 1 FROM sports WHERE sport_id = ?1", sport_id)? {
    return Err(CoreError::SportNotFound(sport_id).into());
  }

  let sub = match select_subscription(&tx, member_id, sport_id)? {
    Some(existing) if existing.is_active() => {
      return Err(CoreError::AlreadySubscribed { member_id, sport_id }.into());
    }
    Some(mut cancelled) => {
      cancelled.reactivate(now);
      write_subscription_state(&tx, &cancelled)?;
      cancelled
    }
    None => {
      let fresh = Subscription::new_active(member_id, sport_id, now);
      tx.execute(
        "INSERT INTO subscriptions (
           subscription_id, member_id, sport_id, subscription_date, status,
           created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
          encode_uuid(fresh.subscription_id),
          encode_uuid(fresh.member_id),
          encode_uuid(fresh.sport_id),
          encode_dt(fresh.subscription_date),
          fresh.status.as_str(),
          encode_dt(fresh.created_at),
          encode_dt(fresh.updated_at),
        ],
      )
      .map_err(unique_as(
        "subscriptions.member_id",
        CoreError::AlreadySubscribed { member_id, sport_id },
      ))?;
      fresh
    }
  };

  tx.commit()?;
  Ok(sub)
}

pub fn cancel(
  conn: &mut Connection,
  member_id: Uuid,
  sport_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Subscription> {
  let tx = begin_write(conn)?;

  let mut sub = select_subscription(&tx, member_id, sport_id)?
    .ok_or(CoreError::SubscriptionNotFound { member_id, sport_id })?;
  sub.cancel(now);
  write_subscription_state(&tx, &sub)?;

  tx.commit()?;
  Ok(sub)
}

pub fn select_member_subscriptions(
  conn: &Connection,
  member_id: Uuid,
) -> Result<Vec<Subscription>> {
  query_subscriptions(
    conn,
    &format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions sub
       WHERE sub.member_id = ?1
       ORDER BY sub.rowid"
    ),
    params![encode_uuid(member_id)],
  )
}

pub fn select_sport_subscriptions(
  conn: &Connection,
  sport_id: Uuid,
) -> Result<Vec<Subscription>> {
  query_subscriptions(
    conn,
    &format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions sub
       WHERE sub.sport_id = ?1
       ORDER BY sub.rowid"
    ),
    params![encode_uuid(sport_id)],
  )
}

pub fn select_all_subscriptions(conn: &Connection) -> Result<Vec<Subscription>> {
  query_subscriptions(
    conn,
    &format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions sub ORDER BY sub.rowid"
    ),
    [],
  )
}

// ─── Derived views ───────────────────────────────────────────────────────────

pub fn member_with_sports(
  conn: &mut Connection,
  member_id: Uuid,
) -> Result<Option<MemberWithSports>> {
  let tx = conn.transaction()?;

  let Some(member) = select_member(&tx, member_id)? else {
    return Ok(None);
  };

  let active = SubscriptionStatus::Active.as_str();
  let subscriptions = query_subscriptions(
    &tx,
    &format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions sub
       WHERE sub.member_id = ?1 AND sub.status = ?2
       ORDER BY sub.rowid"
    ),
    params![encode_uuid(member_id), active],
  )?;

  // Inner join: subscriptions pointing at deleted sports drop out here.
  let sports = query_sports(
    &tx,
    &format!(
      "SELECT {SPORT_COLUMNS} FROM subscriptions sub
       JOIN sports sp ON sp.sport_id = sub.sport_id
       WHERE sub.member_id = ?1 AND sub.status = ?2
       ORDER BY sub.rowid"
    ),
    params![encode_uuid(member_id), active],
  )?;

  tx.commit()?;
  Ok(Some(MemberWithSports { member, sports, subscriptions }))
}

pub fn sport_with_members(
  conn: &mut Connection,
  sport_id: Uuid,
) -> Result<Option<SportWithMembers>> {
  let tx = conn.transaction()?;

  let Some(sport) = select_sport(&tx, sport_id)? else {
    return Ok(None);
  };

  let members = query_members(
    &tx,
    &format!(
      "SELECT {MEMBER_COLUMNS} FROM subscriptions sub
       JOIN members m ON m.member_id = sub.member_id
       WHERE sub.sport_id = ?1 AND sub.status = ?2
       ORDER BY sub.rowid"
    ),
    params![encode_uuid(sport_id), SubscriptionStatus::Active.as_str()],
  )?;

  tx.commit()?;
  Ok(Some(SportWithMembers::new(sport, members)))
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

pub fn clear_all(conn: &mut Connection) -> Result<()> {
  let tx = begin_write(conn)?;
  tx.execute_batch(
    "DELETE FROM subscriptions;
     DELETE FROM members;
     DELETE FROM sports;",
  )?;
  tx.commit()?;
  Ok(())
}

pub fn user_version(conn: &Connection) -> Result<i64> {
  Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}
