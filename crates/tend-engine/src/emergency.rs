//! Emergency coverage resolver — detects house/shift cells with staff
//! scheduled but nobody present on a date, and relocates a caregiver from an
//! over-staffed donor cell on the same shift.
//!
//! The relocation is expressed purely as date-scoped reassignments: the
//! emergency cell's recipients move to the relocated caregiver under the
//! sentinel [`ReassignmentOrigin::CoverageGap`] origin, and the mover's own
//! caseload is absorbed by the donor cell's remaining caregivers. Cross-shift
//! donation is not permitted; an emergency without a same-shift donor is
//! returned unresolved, never silently dropped.

use std::collections::HashMap;

use chrono::NaiveDate;
use tend_core::{
  assignment::{
    CareRecipientAssignment, ReassignReason, ReassignmentOrigin,
    TemporaryReassignment,
  },
  roster::CareRecipient,
  schedule::{ScheduleAssignment, Shift, weekday_of},
};
use uuid::Uuid;

use crate::coverage::{caseload_for_date, headcounts};

// ─── Check ───────────────────────────────────────────────────────────────────

/// A cell with scheduled staff but zero present caregivers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmergencyCell {
  pub house_id: Uuid,
  pub shift:    Shift,
  /// Caregivers scheduled (all absent) in the cell.
  pub total:    usize,
}

/// A cell that can spare a caregiver.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DonorCandidate {
  pub house_id: Uuid,
  pub shift:    Shift,
  pub present:  Vec<Uuid>,
  pub surplus:  usize,
}

/// Result of [`check`] — what an operator reviews before activating.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmergencyCheck {
  pub date:   NaiveDate,
  pub needs:  Vec<EmergencyCell>,
  /// Donor candidates sorted by descending surplus.
  pub donors: Vec<DonorCandidate>,
}

/// Recompute present-vs-scheduled headcounts for `date` and classify cells.
pub fn check(
  assignments: &[ScheduleAssignment],
  date: NaiveDate,
) -> EmergencyCheck {
  let mut needs = Vec::new();
  let mut donors = Vec::new();

  for ((house_id, shift), cell) in headcounts(assignments, date) {
    if cell.present.is_empty() && cell.total > 0 {
      needs.push(EmergencyCell { house_id, shift, total: cell.total });
    } else if cell.present.len() > 1 {
      donors.push(DonorCandidate {
        house_id,
        shift,
        surplus: cell.present.len() - 1,
        present: cell.present,
      });
    }
  }

  needs.sort_by_key(|n| (n.house_id, n.shift));
  donors.sort_by(|a, b| {
    b.surplus
      .cmp(&a.surplus)
      .then_with(|| (a.house_id, a.shift).cmp(&(b.house_id, b.shift)))
  });

  EmergencyCheck { date, needs, donors }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// An operator's explicit donor selection for one emergency cell
/// (interactive mode). Without one the largest-surplus rule applies.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct DonorChoice {
  pub need_house:  Uuid,
  pub need_shift:  Shift,
  pub donor_house: Uuid,
  /// Specific caregiver to relocate; defaults to the donor cell's first
  /// present caregiver.
  pub mover:       Option<Uuid>,
}

/// One executed relocation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Relocation {
  pub need_house:  Uuid,
  pub shift:       Shift,
  pub donor_house: Uuid,
  pub mover:       Uuid,
  /// Emergency recipients covered by the mover.
  pub covered:     usize,
  /// Mover's own recipients absorbed by donor-house peers.
  pub backfilled:  usize,
}

/// The write set produced by planning one activation.
#[derive(Debug)]
pub struct EmergencyPlan {
  pub date:        NaiveDate,
  pub relocations: Vec<Relocation>,
  pub unresolved:  Vec<EmergencyCell>,
  pub revoke:      Vec<Uuid>,
  pub create:      Vec<TemporaryReassignment>,
}

/// Plan relocations for every emergency in `snapshot`, honouring operator
/// `choices` where given.
///
/// `recipients` is the active roster (house lookup); `base` the generation's
/// recipient rows; `overrides` the non-revoked reassignments for the date.
pub fn plan_emergency(
  snapshot: &EmergencyCheck,
  recipients: &[CareRecipient],
  base: &[CareRecipientAssignment],
  overrides: &[TemporaryReassignment],
  version: i64,
  choices: &[DonorChoice],
) -> EmergencyPlan {
  let date = snapshot.date;
  let weekday = weekday_of(date);
  let house_of: HashMap<Uuid, Uuid> = recipients
    .iter()
    .map(|r| (r.recipient_id, r.house_id))
    .collect();

  // Mutable view of donor cells: surplus shrinks as movers leave.
  let mut donor_pool: Vec<DonorCandidate> = snapshot.donors.clone();

  let mut plan = EmergencyPlan {
    date,
    relocations: Vec::new(),
    unresolved: Vec::new(),
    revoke: Vec::new(),
    create: Vec::new(),
  };

  for need in &snapshot.needs {
    let choice = choices
      .iter()
      .find(|c| c.need_house == need.house_id && c.need_shift == need.shift);

    let donor_idx = match choice {
      Some(c) => donor_pool.iter().position(|d| {
        d.house_id == c.donor_house && d.shift == need.shift && d.present.len() > 1
      }),
      // Largest remaining surplus wins, re-evaluated per need: each
      // relocation shrinks its donor, so the initial sort goes stale.
      None => donor_pool
        .iter()
        .enumerate()
        .filter(|(_, d)| {
          d.shift == need.shift
            && d.house_id != need.house_id
            && d.present.len() > 1
        })
        .max_by_key(|(_, d)| (d.present.len(), std::cmp::Reverse(d.house_id)))
        .map(|(i, _)| i),
    };

    let Some(donor_idx) = donor_idx else {
      tracing::warn!(
        house = %need.house_id, shift = ?need.shift, %date,
        "emergency unresolved: no donor cell shares the shift"
      );
      plan.unresolved.push(need.clone());
      continue;
    };

    let donor = &mut donor_pool[donor_idx];
    let mover = choice
      .and_then(|c| c.mover)
      .filter(|m| donor.present.contains(m))
      .unwrap_or(donor.present[0]);

    // The mover's donor-house caseload, including anything already
    // redirected to them today; those redirections are now stale. Recipients
    // who reached the mover through a coverage-gap override belong to an
    // emergency cell, not the donor house, and are never backfilled.
    let mover_caseload: Vec<Uuid> =
      caseload_for_date(mover, need.shift, base, overrides, date)
        .into_iter()
        .filter(|rid| {
          !overrides.iter().any(|o| {
            o.recipient_id == *rid
              && o.to_caregiver == mover
              && o.origin == ReassignmentOrigin::CoverageGap
          })
        })
        .collect();
    for o in overrides {
      if o.to_caregiver == mover {
        plan.revoke.push(o.id);
      }
    }

    // Emergency recipients: the need house's roster for this weekday/shift,
    // minus anyone already redirected elsewhere today.
    let mut covered_ids: Vec<Uuid> = base
      .iter()
      .filter(|row| {
        row.status.is_active()
          && row.weekday == weekday
          && row.shift == need.shift
          && house_of.get(&row.recipient_id) == Some(&need.house_id)
          && !overrides
            .iter()
            .any(|o| o.recipient_id == row.recipient_id && o.to_caregiver != mover)
      })
      .map(|row| row.recipient_id)
      .collect();
    covered_ids.sort();
    covered_ids.dedup();

    for recipient_id in &covered_ids {
      plan.create.push(TemporaryReassignment {
        id: Uuid::new_v4(),
        recipient_id: *recipient_id,
        origin: ReassignmentOrigin::CoverageGap,
        to_caregiver: mover,
        date,
        version,
        reason: ReassignReason::EmergencyCover,
        revoked: false,
      });
    }

    // Remaining donor-house caregivers absorb the mover's own caseload.
    donor.present.retain(|cg| *cg != mover);
    donor.surplus = donor.present.len().saturating_sub(1);
    for (i, recipient_id) in mover_caseload.iter().enumerate() {
      plan.create.push(TemporaryReassignment {
        id: Uuid::new_v4(),
        recipient_id: *recipient_id,
        origin: ReassignmentOrigin::Caregiver(mover),
        to_caregiver: donor.present[i % donor.present.len()],
        date,
        version,
        reason: ReassignReason::EmergencyBackfill,
        revoked: false,
      });
    }

    tracing::info!(
      need = %need.house_id, donor = %donor.house_id, mover = %mover,
      shift = ?need.shift, %date,
      covered = covered_ids.len(), backfilled = mover_caseload.len(),
      "emergency relocation planned"
    );

    plan.relocations.push(Relocation {
      need_house:  need.house_id,
      shift:       need.shift,
      donor_house: donor.house_id,
      mover,
      covered:     covered_ids.len(),
      backfilled:  mover_caseload.len(),
    });
  }

  plan
}

// ─── Tests ───────────────────────────────────────────────────────────────────
