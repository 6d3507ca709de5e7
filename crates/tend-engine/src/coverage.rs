//! Derived coverage read-models shared by the patch operations.
//!
//! Nothing here is stored: present/absent headcounts and per-date caseloads
//! are computed from the current generation's rows plus the date's overrides,
//! the same way every reader is expected to derive them.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use tend_core::{
  assignment::{CareRecipientAssignment, ReassignmentOrigin, TemporaryReassignment},
  schedule::{ScheduleAssignment, Shift, weekday_of},
};
use uuid::Uuid;

/// Present-vs-total headcount for one (house, shift) cell on a date.
#[derive(Debug, Clone, Default)]
pub struct CellCount {
  pub total:   usize,
  /// Caregivers scheduled and not marked absent, in assignment order.
  pub present: Vec<Uuid>,
}

/// Headcounts per (house, shift) for one concrete date, considering only
/// caregivers whose day pattern includes the date's weekday.
pub fn headcounts(
  assignments: &[ScheduleAssignment],
  date: NaiveDate,
) -> HashMap<(Uuid, Shift), CellCount> {
  let mut cells: HashMap<(Uuid, Shift), CellCount> = HashMap::new();
  for a in assignments {
    if !a.works_on(date) {
      continue;
    }
    let cell = cells.entry((a.house_id, a.shift)).or_default();
    cell.total += 1;
    if a.present_on(date) {
      cell.present.push(a.caregiver_id);
    }
  }
  cells
}

/// Assigned-staff count per (house, shift, weekday) cell across the whole
/// generation; used by integrator scoring.
pub fn coverage_grid(
  assignments: &[ScheduleAssignment],
) -> HashMap<(Uuid, Shift, Weekday), usize> {
  let mut grid: HashMap<(Uuid, Shift, Weekday), usize> = HashMap::new();
  for a in assignments {
    for day in a.work_days.days() {
      *grid.entry((a.house_id, a.shift, *day)).or_default() += 1;
    }
  }
  grid
}

/// A caregiver's effective caseload for one date: base rows for the date's
/// weekday and their shift, minus recipients redirected away from them that
/// date, plus recipients redirected to them.
///
/// `overrides` must already be the non-revoked reassignments for `date`.
pub fn caseload_for_date(
  caregiver_id: Uuid,
  shift: Shift,
  base: &[CareRecipientAssignment],
  overrides: &[TemporaryReassignment],
  date: NaiveDate,
) -> Vec<Uuid> {
  let weekday = weekday_of(date);

  let redirected_away: Vec<Uuid> = overrides
    .iter()
    .filter(|o| o.origin == ReassignmentOrigin::Caregiver(caregiver_id))
    .map(|o| o.recipient_id)
    .collect();

  let mut caseload: Vec<Uuid> = base
    .iter()
    .filter(|row| {
      row.status.is_active()
        && row.caregiver_id == caregiver_id
        && row.weekday == weekday
        && row.shift == shift
        && !redirected_away.contains(&row.recipient_id)
    })
    .map(|row| row.recipient_id)
    .collect();

  for o in overrides {
    if o.to_caregiver == caregiver_id && !caseload.contains(&o.recipient_id) {
      caseload.push(o.recipient_id);
    }
  }

  caseload
}
