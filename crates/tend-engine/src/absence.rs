//! Absence handler — marks one caregiver absent for one concrete calendar
//! date and moves their recipients, for that date only, to peers in the same
//! house/shift cell.
//!
//! The base schedule is never mutated beyond the `absent_on` flag; coverage
//! is expressed entirely as date-scoped [`TemporaryReassignment`] rows.
//! Re-invoking for the same (assignment, date) first revokes the earlier
//! redirections, so the operation is idempotent rather than additive.

use chrono::NaiveDate;
use tend_core::{
  assignment::{
    CareRecipientAssignment, ReassignReason, ReassignmentOrigin,
    TemporaryReassignment,
  },
  schedule::{ScheduleAssignment, weekday_of},
};
use uuid::Uuid;

// ─── Plan ────────────────────────────────────────────────────────────────────

/// The write set produced by planning one absence.
#[derive(Debug)]
pub struct AbsencePlan {
  pub assignment_id: Uuid,
  pub caregiver_id:  Uuid,
  pub date:          NaiveDate,
  /// Prior overrides touching the caregiver on this date, now stale.
  pub revoke:        Vec<Uuid>,
  pub create:        Vec<TemporaryReassignment>,
  /// Recipients vacated by the absence, in redistribution order.
  pub vacated:       Vec<Uuid>,
  pub peer_count:    usize,
  /// True when no peer exists in the cell — the absence is still recorded,
  /// and this is the trigger condition for the emergency resolver.
  pub uncovered:     bool,
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// Plan the redistribution for marking `assignment` absent on `date`.
///
/// `all_assignments` is the current generation; `base` its recipient rows;
/// `overrides` the non-revoked reassignments already in force for `date`.
pub fn plan_absence(
  assignment: &ScheduleAssignment,
  all_assignments: &[ScheduleAssignment],
  base: &[CareRecipientAssignment],
  overrides: &[TemporaryReassignment],
  date: NaiveDate,
) -> AbsencePlan {
  let cg = assignment.caregiver_id;
  let weekday = weekday_of(date);

  // Revoke every override touching this caregiver on this date: redirections
  // to them can no longer be honoured, and redirections from them are
  // superseded by the redistribution below.
  let revoke: Vec<Uuid> = overrides
    .iter()
    .filter(|o| o.touches(cg))
    .map(|o| o.id)
    .collect();

  let mut vacated: Vec<Uuid> = base
    .iter()
    .filter(|row| {
      row.status.is_active()
        && row.caregiver_id == cg
        && row.weekday == weekday
    })
    .map(|row| row.recipient_id)
    .collect();
  for o in overrides {
    if o.to_caregiver == cg && !vacated.contains(&o.recipient_id) {
      vacated.push(o.recipient_id);
    }
  }

  let peers: Vec<Uuid> = all_assignments
    .iter()
    .filter(|a| {
      a.assignment_id != assignment.assignment_id
        && a.house_id == assignment.house_id
        && a.shift == assignment.shift
        && a.work_days.works(weekday)
        && a.absent_on != Some(date)
    })
    .map(|a| a.caregiver_id)
    .collect();

  let uncovered = peers.is_empty() && !vacated.is_empty();
  let create = if peers.is_empty() {
    Vec::new()
  } else {
    vacated
      .iter()
      .enumerate()
      .map(|(i, recipient_id)| TemporaryReassignment {
        id:           Uuid::new_v4(),
        recipient_id: *recipient_id,
        origin:       ReassignmentOrigin::Caregiver(cg),
        to_caregiver: peers[i % peers.len()],
        date,
        version:      assignment.version,
        reason:       ReassignReason::Absence,
        revoked:      false,
      })
      .collect()
  };

  if uncovered {
    tracing::warn!(
      caregiver = %cg, house = %assignment.house_id, shift = ?assignment.shift,
      %date, recipients = vacated.len(),
      "absence leaves cell with no peer coverage"
    );
  }

  AbsencePlan {
    assignment_id: assignment.assignment_id,
    caregiver_id: cg,
    date,
    revoke,
    create,
    vacated,
    peer_count: peers.len(),
    uncovered,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Weekday;
  use tend_core::{
    assignment::AssignmentStatus,
    schedule::{DayPattern, Shift},
  };

  use super::*;

  fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 3, 2).unwrap() }

  fn cell_assignment(house_id: Uuid) -> ScheduleAssignment {
    ScheduleAssignment {
      assignment_id: Uuid::new_v4(),
      caregiver_id: Uuid::new_v4(),
      house_id,
      shift: Shift::First,
      work_days: DayPattern::window(Weekday::Mon),
      version: 1,
      valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      valid_until: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
      is_current: true,
      absent_on: None,
    }
  }

  fn base_rows(caregiver_id: Uuid, recipients: &[Uuid]) -> Vec<CareRecipientAssignment> {
    recipients
      .iter()
      .map(|recipient_id| CareRecipientAssignment {
        id: Uuid::new_v4(),
        caregiver_id,
        recipient_id: *recipient_id,
        weekday: Weekday::Mon,
        shift: Shift::First,
        version: 1,
        cross_shift: false,
        status: AssignmentStatus::Active,
      })
      .collect()
  }

  #[test]
  fn all_recipients_move_to_the_single_peer_for_that_date_only() {
    let house = Uuid::new_v4();
    let absent = cell_assignment(house);
    let peer = cell_assignment(house);
    let recipients: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let base = base_rows(absent.caregiver_id, &recipients);

    let plan = plan_absence(
      &absent,
      &[absent.clone(), peer.clone()],
      &base,
      &[],
      monday(),
    );

    assert!(!plan.uncovered);
    assert_eq!(plan.create.len(), 3);
    for row in &plan.create {
      assert_eq!(row.to_caregiver, peer.caregiver_id);
      assert_eq!(row.date, monday());
      assert_eq!(row.reason, ReassignReason::Absence);
      assert_eq!(row.origin, ReassignmentOrigin::Caregiver(absent.caregiver_id));
    }
  }

  #[test]
  fn split_among_peers_is_balanced() {
    let house = Uuid::new_v4();
    let absent = cell_assignment(house);
    let peer_a = cell_assignment(house);
    let peer_b = cell_assignment(house);
    let recipients: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    let base = base_rows(absent.caregiver_id, &recipients);

    let plan = plan_absence(
      &absent,
      &[absent.clone(), peer_a.clone(), peer_b.clone()],
      &base,
      &[],
      monday(),
    );

    let to_a =
      plan.create.iter().filter(|r| r.to_caregiver == peer_a.caregiver_id).count();
    let to_b =
      plan.create.iter().filter(|r| r.to_caregiver == peer_b.caregiver_id).count();
    assert_eq!(to_a + to_b, 5);
    assert!(to_a.abs_diff(to_b) <= 1);
  }

  #[test]
  fn reinvocation_revokes_and_recreates_consistently() {
    let house = Uuid::new_v4();
    let absent = cell_assignment(house);
    let peer = cell_assignment(house);
    let recipients: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
    let base = base_rows(absent.caregiver_id, &recipients);
    let all = [absent.clone(), peer.clone()];

    let first = plan_absence(&absent, &all, &base, &[], monday());
    // Second invocation sees the first plan's rows in force.
    let second = plan_absence(&absent, &all, &base, &first.create, monday());

    assert_eq!(second.revoke.len(), first.create.len());
    let mut before: Vec<(Uuid, Uuid)> =
      first.create.iter().map(|r| (r.recipient_id, r.to_caregiver)).collect();
    let mut after: Vec<(Uuid, Uuid)> =
      second.create.iter().map(|r| (r.recipient_id, r.to_caregiver)).collect();
    before.sort();
    after.sort();
    assert_eq!(before, after);
  }

  #[test]
  fn incoming_redirections_are_revoked_and_passed_on() {
    let house = Uuid::new_v4();
    let absent = cell_assignment(house);
    let peer = cell_assignment(house);
    let own = Uuid::new_v4();
    let inherited = Uuid::new_v4();
    let base = base_rows(absent.caregiver_id, &[own]);

    // `inherited` was redirected to the now-absent caregiver earlier today.
    let incoming = TemporaryReassignment {
      id:           Uuid::new_v4(),
      recipient_id: inherited,
      origin:       ReassignmentOrigin::Caregiver(Uuid::new_v4()),
      to_caregiver: absent.caregiver_id,
      date:         monday(),
      version:      1,
      reason:       ReassignReason::Absence,
      revoked:      false,
    };

    let plan = plan_absence(
      &absent,
      &[absent.clone(), peer.clone()],
      &base,
      std::slice::from_ref(&incoming),
      monday(),
    );

    assert!(plan.revoke.contains(&incoming.id));
    let moved: Vec<Uuid> = plan.create.iter().map(|r| r.recipient_id).collect();
    assert!(moved.contains(&own));
    assert!(moved.contains(&inherited));
  }

  #[test]
  fn no_peer_reports_uncovered_without_creating_rows() {
    let house = Uuid::new_v4();
    let absent = cell_assignment(house);
    let base = base_rows(absent.caregiver_id, &[Uuid::new_v4()]);

    let plan =
      plan_absence(&absent, std::slice::from_ref(&absent), &base, &[], monday());

    assert!(plan.uncovered);
    assert!(plan.create.is_empty());
  }
}
