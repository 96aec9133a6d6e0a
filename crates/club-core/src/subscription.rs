//! Subscription — the link between a member and a sport.
//!
//! At most one subscription row exists for a given (member, sport) pair.
//! Cancelling keeps the row for history; subscribing again reactivates it in
//! place.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  Active,
  Cancelled,
}

impl SubscriptionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Cancelled => "cancelled",
    }
  }
}

impl FromStr for SubscriptionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "cancelled" => Ok(Self::Cancelled),
      other => Err(Error::UnknownVariant {
        field: "subscription status",
        value: other.to_owned(),
      }),
    }
  }
}

/// A stored subscription record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id:   Uuid,
  pub member_id:         Uuid,
  pub sport_id:          Uuid,
  /// When the subscription was (re)activated.
  pub subscription_date: DateTime<Utc>,
  pub status:            SubscriptionStatus,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Subscription {
  /// A fresh active subscription for the pair.
  pub fn new_active(member_id: Uuid, sport_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      subscription_id: Uuid::new_v4(),
      member_id,
      sport_id,
      subscription_date: now,
      status: SubscriptionStatus::Active,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn is_active(&self) -> bool { self.status == SubscriptionStatus::Active }

  /// Bring a cancelled row back to active.
  pub fn reactivate(&mut self, now: DateTime<Utc>) {
    self.status = SubscriptionStatus::Active;
    self.subscription_date = now;
    self.updated_at = now;
  }

  pub fn cancel(&mut self, now: DateTime<Utc>) {
    self.status = SubscriptionStatus::Cancelled;
    self.updated_at = now;
  }
}
