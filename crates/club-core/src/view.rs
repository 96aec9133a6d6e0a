//! Derived read models joining members and sports through their active
//! subscriptions. Never stored, always computed.

use serde::{Deserialize, Serialize};

use crate::{member::Member, sport::Sport, subscription::Subscription};

/// A member together with every sport it is actively subscribed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithSports {
  #[serde(flatten)]
  pub member:        Member,
  /// Sports reachable through active subscriptions, in subscription order.
  /// Subscriptions whose sport has been deleted are skipped.
  pub sports:        Vec<Sport>,
  /// The active subscription rows for this member.
  pub subscriptions: Vec<Subscription>,
}

/// A sport together with every member actively subscribed to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportWithMembers {
  #[serde(flatten)]
  pub sport:        Sport,
  /// Members reachable through active subscriptions. Subscriptions whose
  /// member has been deleted are skipped.
  pub members:      Vec<Member>,
  /// Always `members.len()`.
  pub member_count: usize,
}

impl SportWithMembers {
  pub fn new(sport: Sport, members: Vec<Member>) -> Self {
    let member_count = members.len();
    Self { sport, members, member_count }
  }
}
