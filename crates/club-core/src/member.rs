//! Member — a person who belongs to the club.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
  #[default]
  Active,
  Inactive,
}

impl MemberStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }
}

impl FromStr for MemberStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      other => Err(Error::UnknownVariant {
        field: "member status",
        value: other.to_owned(),
      }),
    }
  }
}

/// A stored member record. `email` is unique across all members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub member_id:       Uuid,
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  pub phone:           String,
  pub date_of_birth:   NaiveDate,
  pub address:         String,
  pub membership_date: NaiveDate,
  pub status:          MemberStatus,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Member {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Merge `patch` onto this record and bump `updated_at`.
  pub fn apply(&mut self, patch: MemberPatch, now: DateTime<Utc>) {
    let MemberPatch {
      first_name,
      last_name,
      email,
      phone,
      date_of_birth,
      address,
      membership_date,
      status,
    } = patch;

    if let Some(v) = first_name {
      self.first_name = v;
    }
    if let Some(v) = last_name {
      self.last_name = v;
    }
    if let Some(v) = email {
      self.email = v;
    }
    if let Some(v) = phone {
      self.phone = v;
    }
    if let Some(v) = date_of_birth {
      self.date_of_birth = v;
    }
    if let Some(v) = address {
      self.address = v;
    }
    if let Some(v) = membership_date {
      self.membership_date = v;
    }
    if let Some(v) = status {
      self.status = v;
    }
    self.updated_at = now;
  }
}

/// Input to [`crate::store::ClubStore::add_member`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
  pub first_name:      String,
  pub last_name:       String,
  pub email:           String,
  pub phone:           String,
  pub date_of_birth:   NaiveDate,
  pub address:         String,
  pub membership_date: NaiveDate,
  #[serde(default)]
  pub status:          MemberStatus,
}

impl NewMember {
  pub fn into_member(self, member_id: Uuid, now: DateTime<Utc>) -> Member {
    Member {
      member_id,
      first_name: self.first_name,
      last_name: self.last_name,
      email: self.email,
      phone: self.phone,
      date_of_birth: self.date_of_birth,
      address: self.address,
      membership_date: self.membership_date,
      status: self.status,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Partial update for [`crate::store::ClubStore::update_member`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPatch {
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  /// Must not collide with another member's email.
  pub email:           Option<String>,
  pub phone:           Option<String>,
  pub date_of_birth:   Option<NaiveDate>,
  pub address:         Option<String>,
  pub membership_date: Option<NaiveDate>,
  pub status:          Option<MemberStatus>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alice() -> Member {
    NewMember {
      first_name:      "Alice".into(),
      last_name:       "Liddell".into(),
      email:           "alice@example.com".into(),
      phone:           "555-0100".into(),
      date_of_birth:   NaiveDate::from_ymd_opt(1990, 5, 4).unwrap(),
      address:         "1 Rabbit Hole".into(),
      membership_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      status:          MemberStatus::Active,
    }
    .into_member(Uuid::new_v4(), Utc::now())
  }

  #[test]
  fn status_parses_its_own_encoding() {
    for status in [MemberStatus::Active, MemberStatus::Inactive] {
      assert_eq!(status.as_str().parse::<MemberStatus>().unwrap(), status);
    }
    assert!("suspended".parse::<MemberStatus>().is_err());
  }

  #[test]
  fn apply_updates_status_and_keeps_identity() {
    let mut member = alice();
    let id = member.member_id;

    member.apply(
      MemberPatch {
        status: Some(MemberStatus::Inactive),
        ..Default::default()
      },
      Utc::now(),
    );

    assert_eq!(member.member_id, id);
    assert_eq!(member.status, MemberStatus::Inactive);
    assert_eq!(member.email, "alice@example.com");
    assert_eq!(member.full_name(), "Alice Liddell");
  }
}
