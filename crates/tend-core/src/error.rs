//! Error types for `tend-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("schedule duration must be between 1 and 12 months, got {0}")]
  InvalidDuration(u32),

  #[error("caregiver not found: {0}")]
  CaregiverNotFound(Uuid),

  #[error("house not found: {0}")]
  HouseNotFound(Uuid),

  #[error("care recipient not found: {0}")]
  RecipientNotFound(Uuid),

  #[error("schedule assignment not found: {0}")]
  AssignmentNotFound(Uuid),

  #[error("no current schedule version; run a generation first")]
  NoCurrentVersion,

  #[error("assignment {0} belongs to a retired schedule version")]
  StaleAssignment(Uuid),

  #[error("caregiver {0} already has an assignment in the current version")]
  AlreadyAssigned(Uuid),

  #[error("date {date} is outside the current version's validity window")]
  DateOutOfWindow { date: NaiveDate },

  #[error("cannot generate a schedule: {0}")]
  EmptyRoster(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
