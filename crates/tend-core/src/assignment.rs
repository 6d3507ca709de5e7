//! Care-recipient assignments and temporary reassignments.
//!
//! A `CareRecipientAssignment` is part of the base generation: it binds one
//! recipient to one caregiver for a (weekday, shift) cell. A
//! `TemporaryReassignment` is a date-scoped override layered on top of the
//! base generation; it never mutates base rows.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::Shift;

// ─── Base recipient assignment ───────────────────────────────────────────────

/// Lifecycle status of a base recipient assignment. Rows are retired by
/// flipping to `Redistributed`, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
  Active,
  Redistributed,
}

impl AssignmentStatus {
  pub fn is_active(self) -> bool { matches!(self, Self::Active) }
}

/// Binds one care recipient to one caregiver for a recurring (weekday, shift)
/// cell within one generation.
///
/// Invariant: for a given (recipient, weekday, shift, version) there is at
/// most one `Active` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareRecipientAssignment {
  pub id:           Uuid,
  pub caregiver_id: Uuid,
  pub recipient_id: Uuid,
  pub weekday:      Weekday,
  pub shift:        Shift,
  pub version:      i64,
  /// True when the row was created by the coverage-gap safety net and the
  /// caregiver works a different shift than `shift`.
  pub cross_shift:  bool,
  pub status:       AssignmentStatus,
}

// ─── Temporary reassignment ──────────────────────────────────────────────────

/// Where a temporarily reassigned recipient came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "caregiver_id", rename_all = "snake_case")]
pub enum ReassignmentOrigin {
  /// The recipient's caregiver for the date; usually absent.
  Caregiver(Uuid),
  /// Emergency sentinel: the recipient's house/shift cell had no present
  /// caregiver at all, so the move originates from the gap itself rather
  /// than from a specific peer.
  CoverageGap,
}

/// Why a temporary reassignment was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassignReason {
  /// Peer coverage for a single marked absence.
  Absence,
  /// A relocated donor caregiver covering an emergency cell.
  EmergencyCover,
  /// Donor-house peers absorbing the relocated caregiver's own caseload.
  EmergencyBackfill,
}

/// A date-scoped override redirecting one recipient to another caregiver
/// without altering the base schedule. Cleared (revoked) rows are flagged,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryReassignment {
  pub id:           Uuid,
  pub recipient_id: Uuid,
  pub origin:       ReassignmentOrigin,
  pub to_caregiver: Uuid,
  pub date:         NaiveDate,
  pub version:      i64,
  pub reason:       ReassignReason,
  pub revoked:      bool,
}

impl TemporaryReassignment {
  /// Whether this override involves `caregiver_id` on either end.
  pub fn touches(&self, caregiver_id: Uuid) -> bool {
    self.to_caregiver == caregiver_id
      || self.origin == ReassignmentOrigin::Caregiver(caregiver_id)
  }
}
