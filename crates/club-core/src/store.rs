//! The `ClubStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `club-store-sqlite`).
//! Callers (the `club` binary, any presentation layer) depend on this
//! abstraction and are handed one explicitly constructed store; there is no
//! global instance.

use std::future::Future;

use uuid::Uuid;

use crate::{
  member::{Member, MemberPatch, MemberStatus, NewMember},
  sport::{NewSport, Sport, SportPatch},
  subscription::Subscription,
  view::{MemberWithSports, SportWithMembers},
};

/// Abstraction over a club store backend.
///
/// Every operation either fully applies or fails, leaving all three
/// collections exactly as they were. Full scans return records in insertion
/// order.
///
/// References from subscriptions to members and sports are checked when a
/// subscription is created but are not cascaded on delete: deleting a sport
/// or member leaves its subscription rows in place.
pub trait ClubStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Sports ────────────────────────────────────────────────────────────

  /// Persist a new sport with a fresh id and `created_at == updated_at`.
  fn add_sport(
    &self,
    input: NewSport,
  ) -> impl Future<Output = Result<Sport, Self::Error>> + Send + '_;

  /// Retrieve a sport by id. Returns `None` if not found.
  fn get_sport(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Sport>, Self::Error>> + Send + '_;

  fn get_all_sports(
    &self,
  ) -> impl Future<Output = Result<Vec<Sport>, Self::Error>> + Send + '_;

  /// All sports whose category equals `category` exactly.
  fn get_sports_by_category<'a>(
    &'a self,
    category: &'a str,
  ) -> impl Future<Output = Result<Vec<Sport>, Self::Error>> + Send + 'a;

  /// Merge `patch` onto the stored sport and bump `updated_at`.
  ///
  /// Returns a not-found error if `id` is absent.
  fn update_sport(
    &self,
    id: Uuid,
    patch: SportPatch,
  ) -> impl Future<Output = Result<Sport, Self::Error>> + Send + '_;

  /// Remove a sport. Returns whether a row was removed.
  fn delete_sport(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Members ───────────────────────────────────────────────────────────

  /// Persist a new member. Fails with a conflict if the email is taken.
  fn add_member(
    &self,
    input: NewMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  fn get_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  fn get_member_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + 'a;

  fn get_all_members(
    &self,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  fn get_members_by_status(
    &self,
    status: MemberStatus,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Merge `patch` onto the stored member and bump `updated_at`.
  ///
  /// Fails with not-found if `id` is absent, or with a conflict if the patch
  /// moves the member onto another member's email.
  fn update_member(
    &self,
    id: Uuid,
    patch: MemberPatch,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Remove a member. Returns whether a row was removed.
  fn delete_member(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Subscribe a member to a sport.
  ///
  /// - Fails with not-found if either record is absent.
  /// - Fails with a conflict if an active subscription for the pair exists.
  /// - If a cancelled subscription for the pair exists it is reactivated in
  ///   place: same id, `subscription_date` refreshed.
  fn subscribe_member_to_sport(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Point lookup by (member, sport) pair, any status.
  fn get_subscription(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// All subscription rows (any status) for a member.
  fn get_member_subscriptions(
    &self,
    member_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// All subscription rows (any status) for a sport.
  fn get_sport_subscriptions(
    &self,
    sport_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  fn get_all_subscriptions(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Mark the pair's subscription cancelled. The row is kept for history.
  ///
  /// Fails with not-found if the pair has no subscription.
  fn cancel_subscription(
    &self,
    member_id: Uuid,
    sport_id: Uuid,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  // ── Derived views ─────────────────────────────────────────────────────

  /// The member plus the sports reachable through its active subscriptions.
  /// Returns `None` if the member does not exist.
  fn get_member_with_sports(
    &self,
    member_id: Uuid,
  ) -> impl Future<Output = Result<Option<MemberWithSports>, Self::Error>> + Send + '_;

  /// The sport plus the members reachable through its active subscriptions.
  /// Returns `None` if the sport does not exist.
  fn get_sport_with_members(
    &self,
    sport_id: Uuid,
  ) -> impl Future<Output = Result<Option<SportWithMembers>, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Empty all three collections in one step.
  fn clear_all_data(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
