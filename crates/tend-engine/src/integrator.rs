//! New-caregiver integrator — slots a caregiver without a current-generation
//! assignment into the existing schedule.
//!
//! Every (house, shift, 5-day-window) combination is scored by how many
//! understaffed coverage cells it would push to or above floor; critical
//! (zero-coverage) and high-acuity cells score higher, and weekend coverage
//! breaks ties. On confirmation the affected cells get a full recipient
//! redistribution — not a leftover top-up — retiring the superseded rows.

use std::collections::HashMap;

use tend_core::{
  assignment::CareRecipientAssignment,
  config::EngineConfig,
  roster::{CareRecipient, House},
  schedule::{
    ALL_DAYS, DayPattern, ScheduleAssignment, ScheduleVersion, Shift,
  },
};
use uuid::Uuid;

use crate::{coverage::coverage_grid, distributor};

// ─── Recommendation ──────────────────────────────────────────────────────────

/// One scored placement option.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlacementCandidate {
  pub house_id:       Uuid,
  pub shift:          Shift,
  pub work_days:      DayPattern,
  pub score:          i64,
  /// Below-floor cells this placement pushes to or above floor.
  pub cells_repaired: usize,
  /// Of those, cells that currently have zero coverage.
  pub zero_cells:     usize,
  pub weekend_days:   usize,
}

/// Score all placements and return the best window per (house, shift),
/// ranked. The per-house-and-shift cap keeps the offered set diversified
/// instead of seven near-identical windows for the neediest cell.
pub fn recommend(
  houses: &[House],
  assignments: &[ScheduleAssignment],
  cfg: &EngineConfig,
) -> Vec<PlacementCandidate> {
  let grid = coverage_grid(assignments);
  let mut best: HashMap<(Uuid, Shift), PlacementCandidate> = HashMap::new();

  for house in houses {
    let floor = cfg.cell_floor(house.high_acuity);
    for shift in Shift::ALL {
      for start in ALL_DAYS {
        let pattern = DayPattern::window(start);
        let mut score = 0i64;
        let mut repaired = 0usize;
        let mut zero = 0usize;

        for day in pattern.days() {
          let staffed = grid
            .get(&(house.house_id, shift, *day))
            .copied()
            .unwrap_or(0);
          let mut cell = 0i64;
          if staffed == 0 {
            cell = 3;
            zero += 1;
            repaired += 1;
          } else if staffed < floor {
            cell = 1;
            repaired += 1;
          }
          if house.high_acuity {
            cell *= 2;
          }
          score += cell;
        }

        let candidate = PlacementCandidate {
          house_id: house.house_id,
          shift,
          weekend_days: pattern.weekend_days(),
          work_days: pattern,
          score,
          cells_repaired: repaired,
          zero_cells: zero,
        };

        let slot = best.entry((house.house_id, shift));
        match slot {
          std::collections::hash_map::Entry::Vacant(v) => {
            v.insert(candidate);
          }
          std::collections::hash_map::Entry::Occupied(mut o) => {
            if ranking(&candidate) > ranking(o.get()) {
              o.insert(candidate);
            }
          }
        }
      }
    }
  }

  let mut ranked: Vec<PlacementCandidate> = best.into_values().collect();
  ranked.sort_by(|a, b| {
    ranking(b)
      .cmp(&ranking(a))
      .then_with(|| (a.house_id, a.shift).cmp(&(b.house_id, b.shift)))
  });
  ranked
}

fn ranking(c: &PlacementCandidate) -> (i64, usize) { (c.score, c.weekend_days) }

// ─── Integration ─────────────────────────────────────────────────────────────

/// A confirmed placement, as accepted from the operator.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Placement {
  pub house_id:  Uuid,
  pub shift:     Shift,
  pub work_days: DayPattern,
}

/// The write set for integrating one caregiver.
#[derive(Debug)]
pub struct IntegrationPlan {
  pub assignment:     ScheduleAssignment,
  /// Superseded recipient rows in the affected cells, to be retired.
  pub retire:         Vec<Uuid>,
  pub create:         Vec<CareRecipientAssignment>,
  /// Number of (house, shift, weekday) cells recomputed.
  pub cells_recomputed: usize,
}

/// Build the new assignment and fully recompute recipient distribution for
/// every affected (house, shift, weekday) cell.
///
/// `house_assignments` are the current generation's rows for the target
/// house; `base_rows` the generation's recipient rows; `recipients` the
/// house's roster.
pub fn plan_integration(
  caregiver_id: Uuid,
  placement: &Placement,
  version: &ScheduleVersion,
  house_assignments: &[ScheduleAssignment],
  base_rows: &[CareRecipientAssignment],
  recipients: &[CareRecipient],
) -> IntegrationPlan {
  let assignment = ScheduleAssignment {
    assignment_id: Uuid::new_v4(),
    caregiver_id,
    house_id: placement.house_id,
    shift: placement.shift,
    work_days: placement.work_days.clone(),
    version: version.version,
    valid_from: version.valid_from,
    valid_until: version.valid_until,
    is_current: true,
    absent_on: None,
  };

  // Overnight placements repair presence only; no recipient cells change.
  if !placement.shift.direct_care() {
    return IntegrationPlan {
      assignment,
      retire: Vec::new(),
      create: Vec::new(),
      cells_recomputed: 0,
    };
  }

  let roster = distributor::sorted_roster(recipients);
  let in_house: Vec<Uuid> = roster.iter().map(|r| r.recipient_id).collect();

  let mut retire = Vec::new();
  let mut create = Vec::new();
  let mut cells = 0usize;

  for day in placement.work_days.days() {
    // Existing cell members plus the newcomer, in stable order.
    let mut present: Vec<Uuid> = house_assignments
      .iter()
      .filter(|a| a.shift == placement.shift && a.work_days.works(*day))
      .map(|a| a.caregiver_id)
      .collect();
    present.push(caregiver_id);

    retire.extend(
      base_rows
        .iter()
        .filter(|row| {
          row.status.is_active()
            && row.weekday == *day
            && row.shift == placement.shift
            && in_house.contains(&row.recipient_id)
        })
        .map(|row| row.id),
    );

    create.extend(distributor::distribute_cell(
      &present,
      &roster,
      *day,
      placement.shift,
      version.version,
      false,
    ));
    cells += 1;
  }

  IntegrationPlan { assignment, retire, create, cells_recomputed: cells }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
