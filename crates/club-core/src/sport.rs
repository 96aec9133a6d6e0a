//! Sport — an activity members can subscribe to.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored sport record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
  pub sport_id:    Uuid,
  pub name:        String,
  pub description: String,
  pub category:    String,
  /// Optional capacity hint; informational only.
  pub max_members: Option<NonZeroU32>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ClubStore::add_sport`].
/// The id and both timestamps are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSport {
  pub name:        String,
  pub description: String,
  pub category:    String,
  #[serde(default)]
  pub max_members: Option<NonZeroU32>,
}

impl NewSport {
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      name:        name.into(),
      description: description.into(),
      category:    category.into(),
      max_members: None,
    }
  }

  /// Materialise the stored record.
  pub fn into_sport(self, sport_id: Uuid, now: DateTime<Utc>) -> Sport {
    Sport {
      sport_id,
      name: self.name,
      description: self.description,
      category: self.category,
      max_members: self.max_members,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Partial update for [`crate::store::ClubStore::update_sport`]. `None` fields
/// are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
  /// `Some(None)` clears the capacity.
  #[serde(default, with = "double_option")]
  pub max_members: Option<Option<NonZeroU32>>,
}

impl Sport {
  /// Merge `patch` onto this record and bump `updated_at`.
  pub fn apply(&mut self, patch: SportPatch, now: DateTime<Utc>) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(category) = patch.category {
      self.category = category;
    }
    if let Some(max_members) = patch.max_members {
      self.max_members = max_members;
    }
    self.updated_at = now;
  }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
  use serde::{Deserialize, Deserializer, Serialize, Serializer};

  pub fn serialize<T, S>(
    value: &Option<Option<T>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    T: Serialize,
    S: Serializer,
  {
    match value {
      Some(inner) => inner.serialize(serializer),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, T, D>(
    deserializer: D,
  ) -> Result<Option<Option<T>>, D::Error>
  where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
  {
    Option::<T>::deserialize(deserializer).map(Some)
  }
}
