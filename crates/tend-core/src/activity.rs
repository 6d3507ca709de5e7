//! Append-only activity log — every engine operation that writes is recorded
//! with a timestamp, the invoking operator, and an outcome summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  Generated,
  Cleared,
  AbsenceMarked,
  EmergencyActivated,
  CaregiverIntegrated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
  pub event_id: Uuid,
  pub at:       DateTime<Utc>,
  pub operator: String,
  pub kind:     ActivityKind,
  pub summary:  String,
}

/// Input to [`crate::store::ScheduleStore::log_event`].
/// `at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewActivityEvent {
  pub operator: String,
  pub kind:     ActivityKind,
  pub summary:  String,
}
