//! [`SqliteStore`] — the SQLite implementation of [`ClubStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use club_core::{
  member::{Member, MemberPatch, MemberStatus, NewMember},
  seed::starter_sports,
  sport::{NewSport, Sport, SportPatch},
  store::ClubStore,
  subscription::Subscription,
  view::{MemberWithSports, SportWithMembers},
};
use uuid::Uuid;

use crate::{
  Error, Result, queries,
  schema::{SCHEMA, SCHEMA_VERSION},
};

/// How long a connection waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A club store backed by a single SQLite file.
///
/// Construct one at startup and hand clones to every caller. Cloning is cheap:
/// all clones share one connection thread, which also serialises writes.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened club store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing. Starts empty.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let version = self
      .run(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        queries::user_version(conn)
      })
      .await?;

    if version != SCHEMA_VERSION {
      return Err(club_core::Error::NotInitialized.into());
    }
    Ok(())
  }

  /// Write the starter sports if the store holds no sports yet.
  ///
  /// Returns how many sports were inserted (zero when already populated).
  pub async fn seed_if_empty(&self) -> Result<usize> {
    let now = Utc::now();
    let sports: Vec<Sport> = starter_sports()
      .into_iter()
      .map(|s| s.into_sport(Uuid::new_v4(), now))
      .collect();

    let inserted = self
      .run(move |conn| queries::seed_sports(conn, &sports))
      .await?;
    if inserted > 0 {
      tracing::info!(count = inserted, "seeded starter sports");
    }
    Ok(inserted)
  }

  /// Shut down the connection thread. Any clone used afterwards fails with
  /// [`club_core::Error::NotInitialized`].
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Run `f` on the connection thread and flatten the two error layers.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── ClubStore impl ──────────────────────────────────────────────────────────

impl ClubStore for SqliteStore {
  type Error = Error;

  // ── Sports ────────────────────────────────────────────────────────────────

  async fn add_sport(&self, input: NewSport) -> Result<Sport> {
    let sport = input.into_sport(Uuid::new_v4(), Utc::now());

    let row = sport.clone();
    self.run(move |conn| queries::insert_sport(conn, &row)).await?;

    tracing::debug!(sport_id = %sport.sport_id, name = %sport.name, "added sport");
    Ok(sport)
  }

  async fn get_sport(&self, id: Uuid) -> Result<Option<Sport>> {
    self.run(move |conn| queries::select_sport(conn, id)).await
  }

  async fn get_all_sports(&self) -> Result<Vec<Sport>> {
    self.run(|conn| queries::select_all_sports(conn)).await
  }

  async fn get_sports_by_category(&self, category: &str) -> Result<Vec<Sport>> {
    let category = category.to_owned();
    self
      .run(move |conn| queries::select_sports_by_category(conn, &category))
      .await
  }

  async fn update_sport(&self, id: Uuid, patch: SportPatch) -> Result<Sport> {
    let now = Utc::now();
    let sport = self
      .run(move |conn| queries::update_sport(conn, id, patch, now))
      .await?;
    tracing::debug!(sport_id = %id, "updated sport");
    Ok(sport)
  }

  async fn delete_sport(&self, id: Uuid) -> Result<bool> {
    let removed = self.run(move |conn| queries::delete_sport(conn, id)).await?;
    tracing::debug!(sport_id = %id, removed, "deleted sport");
    Ok(removed)
  }

  // ── Members ───────────────────────────────────────────────────────────────

  async fn add_member(&self, input: NewMember) -> Result<Member> {
    let member = input.into_member(Uuid::new_v4(), Utc::now());

    let row = member.clone();
    self
      .run(move |conn| queries::insert_member(conn, &row))
      .await
      .inspect_err(|e| {
        if e.kind() == club_core::ErrorKind::Conflict {
          tracing::warn!(email = %member.email, "rejected duplicate member email");
        }
      })?;

    tracing::debug!(member_id = %member.member_id, "added member");
    Ok(member)
  }

  async fn get_member(&self, id: Uuid) -> Result<Option<Member>> {
    self.run(move |conn| queries::select_member(conn, id)).await
  }

  async fn get_member_by_email(&self, email: &str) -> Result<Option<Member>> {
    let email = email.to_owned();
    self
      .run(move |conn| queries::select_member_by_email(conn, &email))
      .await
  }

  async fn get_all_members(&self) -> Result<Vec<Member>> {
    self.run(|conn| queries::select_all_members(conn)).await
  }

  async fn get_members_by_status(
    &self,
    status: MemberStatus,
  ) -> Result<Vec<Member>> {
    self
      .run(move |conn| queries::select_members_by_status(conn, status))
      .await
  }

  async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<Member> {
    let now = Utc::now();
    let member = self
      .run(move |conn| queries::update_member(conn, id, patch, now))
      .await?;
    tracing::debug!(member_id = %id, "updated member");
    Ok(member)
  }

  async fn delete_member(&self, id: Uuid) -> Result<bool> {
    let removed = self.run(move |conn| queries::delete_member(conn, id)).await?;
    tracing::debug!(member_id = %id, removed, "deleted member");
    Ok(removed)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn subscribe_member_to_sport(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> Result<Subscription> {
    let now = Utc::now();
    let sub = self
      .run(move |conn| queries::subscribe(conn, member_id, sport_id, now))
      .await
      .inspect_err(|e| {
        if e.kind() == club_core::ErrorKind::Conflict {
          tracing::warn!(%member_id, %sport_id, "member already subscribed");
        }
      })?;

    tracing::debug!(
      subscription_id = %sub.subscription_id,
      %member_id,
      %sport_id,
      reactivated = sub.created_at != sub.updated_at,
      "subscribed member to sport"
    );
    Ok(sub)
  }

  async fn get_subscription(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> Result<Option<Subscription>> {
    self
      .run(move |conn| queries::select_subscription(conn, member_id, sport_id))
      .await
  }

  async fn get_member_subscriptions(
    &self,
    member_id: Uuid,
  ) -> Result<Vec<Subscription>> {
    self
      .run(move |conn| queries::select_member_subscriptions(conn, member_id))
      .await
  }

  async fn get_sport_subscriptions(
    &self,
    sport_id: Uuid,
  ) -> Result<Vec<Subscription>> {
    self
      .run(move |conn| queries::select_sport_subscriptions(conn, sport_id))
      .await
  }

  async fn get_all_subscriptions(&self) -> Result<Vec<Subscription>> {
    self.run(|conn| queries::select_all_subscriptions(conn)).await
  }

  async fn cancel_subscription(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> Result<Subscription> {
    let now = Utc::now();
    let sub = self
      .run(move |conn| queries::cancel(conn, member_id, sport_id, now))
      .await?;
    tracing::debug!(%member_id, %sport_id, "cancelled subscription");
    Ok(sub)
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  async fn get_member_with_sports(
    &self,
    member_id: Uuid,
  ) -> Result<Option<MemberWithSports>> {
    self
      .run(move |conn| queries::member_with_sports(conn, member_id))
      .await
  }

  async fn get_sport_with_members(
    &self,
    sport_id: Uuid,
  ) -> Result<Option<SportWithMembers>> {
    self
      .run(move |conn| queries::sport_with_members(conn, sport_id))
      .await
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn clear_all_data(&self) -> Result<()> {
    self.run(queries::clear_all).await?;
    tracing::info!("cleared all club data");
    Ok(())
  }
}
