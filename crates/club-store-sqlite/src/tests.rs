//! Integration tests for `SqliteStore` against an in-memory database.

use std::{num::NonZeroU32, time::Duration};

use chrono::NaiveDate;
use club_core::{
  ErrorKind,
  member::{MemberPatch, MemberStatus, NewMember},
  sport::{NewSport, SportPatch},
  store::ClubStore,
  subscription::SubscriptionStatus,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn football() -> NewSport {
  NewSport::new("Football", "Eleven-a-side", "Team")
}

fn tennis() -> NewSport {
  NewSport::new("Tennis", "Hard courts", "Racket")
}

fn new_member(email: &str) -> NewMember {
  NewMember {
    first_name:      "Alice".into(),
    last_name:       "Liddell".into(),
    email:           email.into(),
    phone:           "555-0100".into(),
    date_of_birth:   NaiveDate::from_ymd_opt(1990, 5, 4).unwrap(),
    address:         "1 Rabbit Hole".into(),
    membership_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    status:          MemberStatus::Active,
  }
}

// ─── Sports ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_sport() {
  let s = store().await;

  let mut input = football();
  input.max_members = NonZeroU32::new(22);
  let sport = s.add_sport(input.clone()).await.unwrap();

  assert_eq!(sport.name, input.name);
  assert_eq!(sport.description, input.description);
  assert_eq!(sport.category, input.category);
  assert_eq!(sport.max_members, input.max_members);
  assert_eq!(sport.created_at, sport.updated_at);

  let fetched = s.get_sport(sport.sport_id).await.unwrap();
  assert_eq!(fetched, Some(sport));
}

#[tokio::test]
async fn get_sport_missing_returns_none() {
  let s = store().await;
  assert!(s.get_sport(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn get_all_sports_preserves_insertion_order() {
  let s = store().await;
  let names = ["Tennis", "Archery", "Football", "Badminton"];
  for name in names {
    s.add_sport(NewSport::new(name, "", "Misc")).await.unwrap();
  }

  let all = s.get_all_sports().await.unwrap();
  let got: Vec<_> = all.iter().map(|sp| sp.name.as_str()).collect();
  assert_eq!(got, names);
}

#[tokio::test]
async fn sports_by_category() {
  let s = store().await;
  s.add_sport(football()).await.unwrap();
  s.add_sport(tennis()).await.unwrap();
  s.add_sport(NewSport::new("Basketball", "", "Team")).await.unwrap();

  let team = s.get_sports_by_category("Team").await.unwrap();
  assert_eq!(team.len(), 2);
  assert!(team.iter().all(|sp| sp.category == "Team"));
  assert!(s.get_sports_by_category("Aquatic").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_sport_merges_and_bumps_updated_at() {
  let s = store().await;
  let sport = s.add_sport(football()).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;

  let updated = s
    .update_sport(
      sport.sport_id,
      SportPatch {
        description: Some("Five-a-side".into()),
        max_members: Some(NonZeroU32::new(10)),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.name, "Football");
  assert_eq!(updated.description, "Five-a-side");
  assert_eq!(updated.max_members, NonZeroU32::new(10));
  assert_eq!(updated.created_at, sport.created_at);
  assert!(updated.updated_at > sport.updated_at);

  let fetched = s.get_sport(sport.sport_id).await.unwrap();
  assert_eq!(fetched, Some(updated));
}

#[tokio::test]
async fn update_missing_sport_is_not_found() {
  let s = store().await;
  let err = s
    .update_sport(Uuid::new_v4(), SportPatch::default())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_sport_then_get_returns_none() {
  let s = store().await;
  let sport = s.add_sport(football()).await.unwrap();

  assert!(s.delete_sport(sport.sport_id).await.unwrap());
  assert!(s.get_sport(sport.sport_id).await.unwrap().is_none());

  // Deleting again is not an error.
  assert!(!s.delete_sport(sport.sport_id).await.unwrap());
}

// ─── Members ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_member() {
  let s = store().await;
  let input = new_member("alice@example.com");
  let member = s.add_member(input.clone()).await.unwrap();

  assert_eq!(member.email, input.email);
  assert_eq!(member.date_of_birth, input.date_of_birth);
  assert_eq!(member.membership_date, input.membership_date);
  assert_eq!(member.status, MemberStatus::Active);

  let fetched = s.get_member(member.member_id).await.unwrap();
  assert_eq!(fetched, Some(member.clone()));

  let by_email = s.get_member_by_email("alice@example.com").await.unwrap();
  assert_eq!(by_email, Some(member));
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
  let s = store().await;
  let first = s.add_member(new_member("a@b.com")).await.unwrap();

  let err = s.add_member(new_member("a@b.com")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert!(matches!(
    err,
    crate::Error::Core(club_core::Error::DuplicateEmail(ref e)) if e == "a@b.com"
  ));

  let all = s.get_all_members().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].member_id, first.member_id);
}

#[tokio::test]
async fn update_member_onto_taken_email_is_conflict() {
  let s = store().await;
  let alice = s.add_member(new_member("alice@example.com")).await.unwrap();
  s.add_member(new_member("bob@example.com")).await.unwrap();

  let err = s
    .update_member(
      alice.member_id,
      MemberPatch {
        email: Some("bob@example.com".into()),
        first_name: Some("Mallory".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  // Nothing from the rejected patch was applied.
  let fetched = s.get_member(alice.member_id).await.unwrap().unwrap();
  assert_eq!(fetched, alice);
}

#[tokio::test]
async fn update_member_keeping_own_email_is_allowed() {
  let s = store().await;
  let alice = s.add_member(new_member("alice@example.com")).await.unwrap();

  let updated = s
    .update_member(
      alice.member_id,
      MemberPatch {
        email: Some("alice@example.com".into()),
        status: Some(MemberStatus::Inactive),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.status, MemberStatus::Inactive);
}

#[tokio::test]
async fn members_by_status() {
  let s = store().await;
  let a = s.add_member(new_member("a@example.com")).await.unwrap();
  s.add_member(new_member("b@example.com")).await.unwrap();
  s.update_member(
    a.member_id,
    MemberPatch { status: Some(MemberStatus::Inactive), ..Default::default() },
  )
  .await
  .unwrap();

  let inactive = s.get_members_by_status(MemberStatus::Inactive).await.unwrap();
  assert_eq!(inactive.len(), 1);
  assert_eq!(inactive[0].member_id, a.member_id);

  let active = s.get_members_by_status(MemberStatus::Active).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].email, "b@example.com");
}

#[tokio::test]
async fn update_missing_member_is_not_found() {
  let s = store().await;
  let err = s
    .update_member(Uuid::new_v4(), MemberPatch::default())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn deleted_member_frees_email() {
  let s = store().await;
  let m = s.add_member(new_member("a@b.com")).await.unwrap();
  assert!(s.delete_member(m.member_id).await.unwrap());
  assert!(s.get_member(m.member_id).await.unwrap().is_none());

  s.add_member(new_member("a@b.com")).await.unwrap();
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_twice_is_conflict() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  let sub = s
    .subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();
  assert_eq!(sub.status, SubscriptionStatus::Active);
  assert_eq!(sub.member_id, member.member_id);
  assert_eq!(sub.sport_id, sport.sport_id);

  let err = s
    .subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let rows = s.get_member_subscriptions(member.member_id).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert!(rows[0].is_active());
}

#[tokio::test]
async fn subscribe_requires_existing_records() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  let err = s
    .subscribe_member_to_sport(Uuid::new_v4(), sport.sport_id)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(club_core::Error::MemberNotFound(_))));

  let err = s
    .subscribe_member_to_sport(member.member_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(club_core::Error::SportNotFound(_))));

  assert!(s.get_all_subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_subscription_by_pair() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  assert!(
    s.get_subscription(member.member_id, sport.sport_id)
      .await
      .unwrap()
      .is_none()
  );

  let sub = s
    .subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();
  let fetched = s
    .get_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap();
  assert_eq!(fetched, Some(sub));
}

#[tokio::test]
async fn cancel_excludes_sport_from_member_view() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let football = s.add_sport(football()).await.unwrap();
  let tennis = s.add_sport(tennis()).await.unwrap();

  s.subscribe_member_to_sport(member.member_id, football.sport_id)
    .await
    .unwrap();
  s.subscribe_member_to_sport(member.member_id, tennis.sport_id)
    .await
    .unwrap();

  let cancelled = s
    .cancel_subscription(member.member_id, football.sport_id)
    .await
    .unwrap();
  assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);

  let view = s
    .get_member_with_sports(member.member_id)
    .await
    .unwrap()
    .unwrap();
  let names: Vec<_> = view.sports.iter().map(|sp| sp.name.as_str()).collect();
  assert_eq!(names, ["Tennis"]);
  assert_eq!(view.subscriptions.len(), 1);

  // The cancelled row is kept for history.
  let rows = s.get_member_subscriptions(member.member_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  let stored = s
    .get_subscription(member.member_id, football.sport_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.status, SubscriptionStatus::Cancelled);
}

#[tokio::test]
async fn cancel_without_subscription_is_not_found() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  let err = s
    .cancel_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(matches!(
    err,
    crate::Error::Core(club_core::Error::SubscriptionNotFound { .. })
  ));
}

#[tokio::test]
async fn cancel_twice_succeeds_and_stays_cancelled() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();
  s.subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();

  let first = s
    .cancel_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let second = s
    .cancel_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap();

  assert_eq!(second.status, SubscriptionStatus::Cancelled);
  assert_eq!(second.subscription_id, first.subscription_id);
  assert!(second.updated_at > first.updated_at);

  let stored = s
    .get_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored, second);
}

#[tokio::test]
async fn resubscribe_reactivates_in_place() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  let first = s
    .subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();
  s.cancel_subscription(member.member_id, sport.sport_id)
    .await
    .unwrap();

  let again = s
    .subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();
  assert_eq!(again.subscription_id, first.subscription_id);
  assert!(again.is_active());
  assert!(again.subscription_date >= first.subscription_date);
  assert_eq!(again.created_at, first.created_at);

  let all = s.get_all_subscriptions().await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn sport_subscriptions_include_every_status() {
  let s = store().await;
  let sport = s.add_sport(football()).await.unwrap();
  let a = s.add_member(new_member("a@example.com")).await.unwrap();
  let b = s.add_member(new_member("b@example.com")).await.unwrap();

  s.subscribe_member_to_sport(a.member_id, sport.sport_id).await.unwrap();
  s.subscribe_member_to_sport(b.member_id, sport.sport_id).await.unwrap();
  s.cancel_subscription(b.member_id, sport.sport_id).await.unwrap();

  let rows = s.get_sport_subscriptions(sport.sport_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].member_id, a.member_id);
  assert_eq!(rows[1].status, SubscriptionStatus::Cancelled);

  let view = s.get_sport_with_members(sport.sport_id).await.unwrap().unwrap();
  assert_eq!(view.member_count, 1);
  assert_eq!(view.members[0].member_id, a.member_id);
}

// ─── Derived views ───────────────────────────────────────────────────────────

#[tokio::test]
async fn football_scenario() {
  let s = store().await;
  let sport = s.add_sport(football()).await.unwrap();
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  s.subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();

  let mws = s
    .get_member_with_sports(member.member_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(mws.member, member);
  assert_eq!(mws.sports.len(), 1);
  assert_eq!(mws.sports[0].name, "Football");

  let swm = s.get_sport_with_members(sport.sport_id).await.unwrap().unwrap();
  assert_eq!(swm.sport, sport);
  assert_eq!(swm.member_count, 1);
  assert_eq!(swm.members[0].email, "a@b.com");
}

#[tokio::test]
async fn views_return_none_for_unknown_ids() {
  let s = store().await;
  assert!(s.get_member_with_sports(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_sport_with_members(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn deletes_leave_dangling_subscriptions() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let other = s.add_member(new_member("c@d.com")).await.unwrap();
  let football = s.add_sport(football()).await.unwrap();
  let tennis = s.add_sport(tennis()).await.unwrap();

  s.subscribe_member_to_sport(member.member_id, football.sport_id)
    .await
    .unwrap();
  s.subscribe_member_to_sport(member.member_id, tennis.sport_id)
    .await
    .unwrap();
  s.subscribe_member_to_sport(other.member_id, tennis.sport_id)
    .await
    .unwrap();

  s.delete_sport(football.sport_id).await.unwrap();
  s.delete_member(other.member_id).await.unwrap();

  // No cascade: every subscription row survives.
  assert_eq!(s.get_all_subscriptions().await.unwrap().len(), 3);
  assert_eq!(
    s.get_sport_subscriptions(football.sport_id).await.unwrap().len(),
    1
  );

  // Joined views skip the dangling side.
  let mws = s
    .get_member_with_sports(member.member_id)
    .await
    .unwrap()
    .unwrap();
  let names: Vec<_> = mws.sports.iter().map(|sp| sp.name.as_str()).collect();
  assert_eq!(names, ["Tennis"]);
  assert_eq!(mws.subscriptions.len(), 2);

  let swm = s.get_sport_with_members(tennis.sport_id).await.unwrap().unwrap();
  assert_eq!(swm.member_count, 1);
  assert_eq!(swm.members[0].member_id, member.member_id);
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_all_data_empties_every_collection() {
  let s = store().await;
  let member = s.add_member(new_member("a@b.com")).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();
  s.subscribe_member_to_sport(member.member_id, sport.sport_id)
    .await
    .unwrap();

  s.clear_all_data().await.unwrap();

  assert!(s.get_all_sports().await.unwrap().is_empty());
  assert!(s.get_all_members().await.unwrap().is_empty());
  assert!(s.get_all_subscriptions().await.unwrap().is_empty());
}

#[tokio::test]
async fn seed_only_fills_an_empty_store() {
  let s = store().await;
  assert!(s.get_all_sports().await.unwrap().is_empty());

  let inserted = s.seed_if_empty().await.unwrap();
  let expected = club_core::seed::starter_sports();
  assert_eq!(inserted, expected.len());

  let names: Vec<_> = s
    .get_all_sports()
    .await
    .unwrap()
    .into_iter()
    .map(|sp| sp.name)
    .collect();
  let expected_names: Vec<_> = expected.into_iter().map(|sp| sp.name).collect();
  assert_eq!(names, expected_names);

  assert_eq!(s.seed_if_empty().await.unwrap(), 0);
}

#[tokio::test]
async fn seed_skips_a_populated_store() {
  let s = store().await;
  s.add_sport(NewSport::new("Curling", "", "Ice")).await.unwrap();

  assert_eq!(s.seed_if_empty().await.unwrap(), 0);
  assert_eq!(s.get_all_sports().await.unwrap().len(), 1);
}

#[tokio::test]
async fn data_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("club.db");

  let member_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    let member = s.add_member(new_member("a@b.com")).await.unwrap();
    let sport = s.add_sport(football()).await.unwrap();
    s.subscribe_member_to_sport(member.member_id, sport.sport_id)
      .await
      .unwrap();
    s.close().await.unwrap();
    member.member_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let view = s.get_member_with_sports(member_id).await.unwrap().unwrap();
  assert_eq!(view.sports.len(), 1);
  assert_eq!(view.sports[0].name, "Football");
}

#[tokio::test]
async fn closed_store_is_not_initialized() {
  let s = store().await;
  let handle = s.clone();
  s.close().await.unwrap();

  let err = handle.get_all_sports().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotInitialized);
}

#[test]
fn fresh_schema_records_its_version() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(crate::schema::SCHEMA).unwrap();

  assert_eq!(
    crate::queries::user_version(&conn).unwrap(),
    crate::schema::SCHEMA_VERSION
  );
}

#[tokio::test]
async fn out_of_range_stored_capacity_is_a_storage_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("club.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let sport = s.add_sport(football()).await.unwrap();

  let raw = rusqlite::Connection::open(&path).unwrap();
  raw
    .execute("UPDATE sports SET max_members = 5000000000", [])
    .unwrap();
  drop(raw);

  let err = s.get_sport(sport.sport_id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Storage);
  assert!(matches!(
    err,
    crate::Error::InvalidColumn { column: "max_members", .. }
  ));
}

#[test]
fn unique_email_violation_maps_to_conflict() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(crate::schema::SCHEMA).unwrap();

  let insert = "INSERT INTO members (member_id, first_name, last_name, email, \
                phone, date_of_birth, address, membership_date, status, \
                created_at, updated_at) \
                VALUES (?1, 'A', 'B', 'a@b.com', '', '1990-01-01', '', \
                '2024-01-01', 'active', '2024-01-01T00:00:00Z', \
                '2024-01-01T00:00:00Z')";
  conn
    .execute(insert, [Uuid::new_v4().to_string()])
    .unwrap();
  let raw_err = conn
    .execute(insert, [Uuid::new_v4().to_string()])
    .unwrap_err();

  let mapped = crate::queries::unique_as(
    "members.email",
    club_core::Error::DuplicateEmail("a@b.com".into()),
  )(raw_err);
  assert_eq!(mapped.kind(), ErrorKind::Conflict);
  assert!(matches!(
    mapped,
    crate::Error::Core(club_core::Error::DuplicateEmail(_))
  ));
}

#[test]
fn unrelated_constraint_violation_stays_a_storage_error() {
  let conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(crate::schema::SCHEMA).unwrap();

  let raw_err = conn
    .execute(
      "INSERT INTO sports (sport_id, name, description, category, \
       max_members, created_at, updated_at) \
       VALUES ('x', 'n', '', 'c', 0, '', '')",
      [],
    )
    .unwrap_err();

  let mapped = crate::queries::unique_as(
    "members.email",
    club_core::Error::DuplicateEmail("a@b.com".into()),
  )(raw_err);
  assert_eq!(mapped.kind(), ErrorKind::Storage);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_handles_subscribe_exactly_once() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("club.db");
  let setup = SqliteStore::open(&path).await.unwrap();

  for round in 0..10 {
    let member = setup
      .add_member(new_member(&format!("m{round}@b.com")))
      .await
      .unwrap();
    let sport = setup.add_sport(football()).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..6 {
      let path = path.clone();
      let (member_id, sport_id) = (member.member_id, sport.sport_id);
      tasks.spawn(async move {
        let s = SqliteStore::open(&path).await.unwrap();
        let result = s.subscribe_member_to_sport(member_id, sport_id).await;
        s.close().await.unwrap();
        result
      });
    }

    let mut ok = 0;
    while let Some(joined) = tasks.join_next().await {
      match joined.unwrap() {
        Ok(_) => ok += 1,
        Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict, "round {round}: {e}"),
      }
    }
    assert_eq!(ok, 1, "round {round}");
    assert_eq!(
      setup
        .get_member_subscriptions(member.member_id)
        .await
        .unwrap()
        .len(),
      1
    );
  }
}
