//! The `ScheduleStore` trait.
//!
//! Implemented by storage backends (e.g. `tend-store-sqlite`). The engine and
//! API depend on this abstraction, not on any concrete backend.
//!
//! The mutation discipline is append-only throughout: rows are created in
//! batches and retired by flag (`is_current`, `status`, `revoked`) — never
//! deleted — so every generation remains auditable as history.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  activity::{ActivityEvent, NewActivityEvent},
  assignment::{CareRecipientAssignment, TemporaryReassignment},
  roster::{
    Caregiver, CareRecipient, House, NewCareRecipient, NewCaregiver, NewHouse,
  },
  schedule::{ScheduleAssignment, ScheduleVersion},
};

/// Abstraction over a tend schedule store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Rosters ───────────────────────────────────────────────────────────

  fn add_caregiver(
    &self,
    input: NewCaregiver,
  ) -> impl Future<Output = Result<Caregiver, Self::Error>> + Send + '_;

  fn get_caregiver(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Caregiver>, Self::Error>> + Send + '_;

  fn list_caregivers(
    &self,
  ) -> impl Future<Output = Result<Vec<Caregiver>, Self::Error>> + Send + '_;

  fn add_house(
    &self,
    input: NewHouse,
  ) -> impl Future<Output = Result<House, Self::Error>> + Send + '_;

  fn list_houses(
    &self,
  ) -> impl Future<Output = Result<Vec<House>, Self::Error>> + Send + '_;

  fn add_recipient(
    &self,
    input: NewCareRecipient,
  ) -> impl Future<Output = Result<CareRecipient, Self::Error>> + Send + '_;

  /// List recipients; `active_only` excludes deactivated residents.
  fn list_recipients(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<CareRecipient>, Self::Error>> + Send + '_;

  // ── Versions ──────────────────────────────────────────────────────────

  /// The single current version, if any generation has run.
  fn current_version(
    &self,
  ) -> impl Future<Output = Result<Option<ScheduleVersion>, Self::Error>> + Send + '_;

  /// The highest version number ever created; 0 when none.
  fn latest_version_number(
    &self,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Create the next version row, not yet current. Readers keep seeing the
  /// previous generation until [`ScheduleStore::activate_version`] flips
  /// currency in one final pass.
  fn create_version(
    &self,
    version:     i64,
    valid_from:  NaiveDate,
    valid_until: NaiveDate,
  ) -> impl Future<Output = Result<ScheduleVersion, Self::Error>> + Send + '_;

  /// Atomic switchover: retire every other version (and its schedule rows)
  /// and mark `version` current, in a single store transaction.
  fn activate_version(
    &self,
    version: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retire the current version without creating a successor. Returns the
  /// retired version number, if there was one.
  fn retire_current_version(
    &self,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  // ── Schedule assignments ──────────────────────────────────────────────

  /// Append one batch of assignment rows. Callers chunk long sequences.
  fn insert_schedule_assignments(
    &self,
    rows: Vec<ScheduleAssignment>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_schedule_assignment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ScheduleAssignment>, Self::Error>> + Send + '_;

  fn list_schedule_assignments(
    &self,
    version: i64,
  ) -> impl Future<Output = Result<Vec<ScheduleAssignment>, Self::Error>> + Send + '_;

  /// The absence handler's only base-schedule mutation: set `absent_on`.
  fn mark_assignment_absent(
    &self,
    id:   Uuid,
    date: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Care-recipient assignments ────────────────────────────────────────

  fn insert_recipient_assignments(
    &self,
    rows: Vec<CareRecipientAssignment>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_recipient_assignments(
    &self,
    version: i64,
  ) -> impl Future<Output = Result<Vec<CareRecipientAssignment>, Self::Error>> + Send + '_;

  /// Flip the given rows to `Redistributed`; used when the integrator
  /// recomputes a cell. Rows are never deleted.
  fn retire_recipient_assignments(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Temporary reassignments ───────────────────────────────────────────

  fn insert_reassignments(
    &self,
    rows: Vec<TemporaryReassignment>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All non-revoked overrides for one concrete date.
  fn list_reassignments(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<TemporaryReassignment>, Self::Error>> + Send + '_;

  fn revoke_reassignments(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Activity log ──────────────────────────────────────────────────────

  fn log_event(
    &self,
    input: NewActivityEvent,
  ) -> impl Future<Output = Result<ActivityEvent, Self::Error>> + Send + '_;

  /// Most recent events first.
  fn list_events(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ActivityEvent>, Self::Error>> + Send + '_;
}
