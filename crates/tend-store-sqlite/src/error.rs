//! Error type for `tend-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tend_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value no codec recognises.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("version not found: {0}")]
  VersionNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
