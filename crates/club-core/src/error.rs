//! Error types for `club-core`.

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of a store failure.
///
/// Every public store operation either succeeds or fails with exactly one of
/// these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The operation referenced an id or pair that does not exist.
  NotFound,
  /// A uniqueness rule would be violated (duplicate email, duplicate active
  /// subscription).
  Conflict,
  /// The store was used before (or after) its storage medium was ready.
  NotInitialized,
  /// The underlying storage medium reported an I/O or decoding failure.
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("sport not found: {0}")]
  SportNotFound(Uuid),

  #[error("member not found: {0}")]
  MemberNotFound(Uuid),

  #[error("no subscription for member {member_id} to sport {sport_id}")]
  SubscriptionNotFound { member_id: Uuid, sport_id: Uuid },

  #[error("a member with email {0:?} already exists")]
  DuplicateEmail(String),

  #[error("member {member_id} is already subscribed to sport {sport_id}")]
  AlreadySubscribed { member_id: Uuid, sport_id: Uuid },

  #[error("store is not initialized")]
  NotInitialized,

  #[error("unknown {field} value: {value:?}")]
  UnknownVariant { field: &'static str, value: String },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::SportNotFound(_)
      | Self::MemberNotFound(_)
      | Self::SubscriptionNotFound { .. } => ErrorKind::NotFound,
      Self::DuplicateEmail(_) | Self::AlreadySubscribed { .. } => {
        ErrorKind::Conflict
      }
      Self::NotInitialized => ErrorKind::NotInitialized,
      Self::UnknownVariant { .. } => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_follow_variants() {
    let id = Uuid::new_v4();
    assert_eq!(Error::SportNotFound(id).kind(), ErrorKind::NotFound);
    assert_eq!(
      Error::SubscriptionNotFound { member_id: id, sport_id: id }.kind(),
      ErrorKind::NotFound
    );
    assert_eq!(
      Error::DuplicateEmail("a@b.com".into()).kind(),
      ErrorKind::Conflict
    );
    assert_eq!(
      Error::AlreadySubscribed { member_id: id, sport_id: id }.kind(),
      ErrorKind::Conflict
    );
    assert_eq!(Error::NotInitialized.kind(), ErrorKind::NotInitialized);
    assert_eq!(
      Error::UnknownVariant { field: "member status", value: "x".into() }.kind(),
      ErrorKind::Storage
    );
  }
}
