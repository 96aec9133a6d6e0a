//! Error type for `club-store-sqlite`.

use club_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] club_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column holds a value its domain type cannot represent.
  #[error("invalid stored {column}: {value}")]
  InvalidColumn { column: &'static str, value: String },
}

impl Error {
  /// Classify this failure; see [`ErrorKind`].
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Database(_)
      | Self::Sqlite(_)
      | Self::Uuid(_)
      | Self::DateParse(_)
      | Self::InvalidColumn { .. } => ErrorKind::Storage,
    }
  }
}

/// A closed connection thread means the store is no longer usable.
impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::ConnectionClosed => {
        Self::Core(club_core::Error::NotInitialized)
      }
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
