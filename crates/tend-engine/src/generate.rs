//! Full-generation planning — allocator, day-pattern assigner, and
//! care-recipient distributor run together to produce one complete
//! generation in memory before anything is written.

use std::collections::HashMap;

use rand::Rng;
use tend_core::{
  assignment::CareRecipientAssignment,
  config::EngineConfig,
  roster::{Caregiver, CareRecipient, House},
  schedule::{ScheduleAssignment, ScheduleVersion},
};
use uuid::Uuid;

use crate::{
  allocator,
  distributor::{self, GapRepair, UnassignedCell},
  patterns::{self, CoverageWarning},
};

// ─── Plan ────────────────────────────────────────────────────────────────────

/// Everything a generation writes, plus everything it could not make whole.
#[derive(Debug)]
pub struct GenerationPlan {
  pub assignments:    Vec<ScheduleAssignment>,
  pub recipient_rows: Vec<CareRecipientAssignment>,
  pub warnings:       Vec<CoverageWarning>,
  pub gap_repairs:    Vec<GapRepair>,
  pub unassigned:     Vec<UnassignedCell>,
}

/// Outcome summary returned to the caller and logged to the activity log.
#[derive(Debug, serde::Serialize)]
pub struct GenerationReport {
  pub version:             i64,
  pub caregivers_assigned: usize,
  pub recipient_rows:      usize,
  pub warnings:            Vec<CoverageWarning>,
  pub gap_repairs:         Vec<GapRepair>,
  pub unassigned:          Vec<UnassignedCell>,
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// Build one complete generation under `version`.
///
/// `last_house` maps caregiver → house from the previous generation, used to
/// discourage repeat placement.
pub fn plan_generation(
  caregivers: &[Caregiver],
  houses: &[House],
  recipients: &[CareRecipient],
  last_house: &HashMap<Uuid, Uuid>,
  version: &ScheduleVersion,
  cfg: &EngineConfig,
  rng: &mut impl Rng,
) -> GenerationPlan {
  let house_by_id: HashMap<Uuid, &House> =
    houses.iter().map(|h| (h.house_id, h)).collect();

  let mut plan = GenerationPlan {
    assignments:    Vec::new(),
    recipient_rows: Vec::new(),
    warnings:       Vec::new(),
    gap_repairs:    Vec::new(),
    unassigned:     Vec::new(),
  };

  for house_plan in allocator::allocate(caregivers, houses, last_house, cfg, rng)
  {
    let house = house_by_id[&house_plan.house_id];
    let mut house_assignments: Vec<ScheduleAssignment> = Vec::new();

    for group in &house_plan.shifts {
      let (pattern_plans, warnings) =
        patterns::assign_patterns(house, group.shift, &group.caregivers, cfg);
      plan.warnings.extend(warnings);

      house_assignments.extend(pattern_plans.into_iter().map(|p| {
        ScheduleAssignment {
          assignment_id: Uuid::new_v4(),
          caregiver_id:  p.caregiver_id,
          house_id:      house.house_id,
          shift:         group.shift,
          work_days:     p.work_days,
          version:       version.version,
          valid_from:    version.valid_from,
          valid_until:   version.valid_until,
          is_current:    true,
          absent_on:     None,
        }
      }));
    }

    let house_recipients: Vec<CareRecipient> = recipients
      .iter()
      .filter(|r| r.house_id == house.house_id)
      .cloned()
      .collect();
    let distribution = distributor::distribute_house(
      house,
      &house_assignments,
      &house_recipients,
      version.version,
    );

    plan.recipient_rows.extend(distribution.rows);
    plan.gap_repairs.extend(distribution.gap_repairs);
    plan.unassigned.extend(distribution.unassigned);
    plan.assignments.extend(house_assignments);
  }

  tracing::info!(
    version = version.version,
    assignments = plan.assignments.len(),
    recipient_rows = plan.recipient_rows.len(),
    warnings = plan.warnings.len(),
    "generation planned"
  );

  plan
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};
  use rand::SeedableRng as _;
  use rand_chacha::ChaCha8Rng;
  use tend_core::schedule::ALL_DAYS;

  use super::*;

  fn caregivers(n: usize) -> Vec<Caregiver> {
    (0..n)
      .map(|i| Caregiver {
        caregiver_id: Uuid::new_v4(),
        display_name: format!("cg-{i}"),
        created_at:   Utc::now(),
      })
      .collect()
  }

  fn one_house() -> House {
    House {
      house_id:      Uuid::new_v4(),
      name:          "alder".into(),
      acuity_weight: 1,
      high_acuity:   false,
      created_at:    Utc::now(),
    }
  }

  fn version() -> ScheduleVersion {
    ScheduleVersion {
      version:     1,
      created_at:  Utc::now(),
      valid_from:  NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      valid_until: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
      is_current:  true,
    }
  }

  /// 7 caregivers, 1 house, weight 1 — every weekday ends with at least one
  /// caregiver on duty.
  #[test]
  fn seven_caregivers_cover_every_weekday() {
    let cgs = caregivers(7);
    let houses = vec![one_house()];
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let plan = plan_generation(
      &cgs,
      &houses,
      &[],
      &HashMap::new(),
      &version(),
      &EngineConfig::default(),
      &mut rng,
    );

    assert_eq!(plan.assignments.len(), 7);
    for day in ALL_DAYS {
      let on_duty = plan
        .assignments
        .iter()
        .filter(|a| a.work_days.works(day))
        .count();
      assert!(on_duty >= 1, "{day:?} has no caregiver");
    }
  }

  #[test]
  fn same_seed_reproduces_the_same_schedule() {
    let cgs = caregivers(12);
    let houses = vec![one_house()];

    let run = |seed: u64| {
      let mut rng = ChaCha8Rng::seed_from_u64(seed);
      let plan = plan_generation(
        &cgs,
        &houses,
        &[],
        &HashMap::new(),
        &version(),
        &EngineConfig::default(),
        &mut rng,
      );
      plan
        .assignments
        .iter()
        .map(|a| (a.caregiver_id, a.shift, a.work_days.clone()))
        .collect::<Vec<_>>()
    };

    assert_eq!(run(42), run(42));
  }

  #[test]
  fn no_caregiver_is_double_booked() {
    let cgs = caregivers(20);
    let houses = vec![one_house(), one_house(), one_house()];
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let plan = plan_generation(
      &cgs,
      &houses,
      &[],
      &HashMap::new(),
      &version(),
      &EngineConfig::default(),
      &mut rng,
    );

    let mut seen: Vec<Uuid> =
      plan.assignments.iter().map(|a| a.caregiver_id).collect();
    let before = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), before);
  }
}
