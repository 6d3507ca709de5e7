//! Day-pattern assigner — gives each caregiver in a house/shift group five
//! consecutive (wrap-around) work weekdays, such that every day of the week
//! keeps adequate coverage.
//!
//! Regular houses with at least seven caregivers get one anchor per weekday,
//! which guarantees literal full-week coverage; smaller groups fall back to
//! greedy window scoring plus a swap-repair pass. High-acuity houses draw
//! from a ranked window library biased toward Thursday–Sunday density.

use chrono::Weekday;
use tend_core::{
  config::EngineConfig,
  roster::House,
  schedule::{ALL_DAYS, DayPattern, Shift, is_weekend},
};
use uuid::Uuid;

/// Window starts ordered by how much weekend coverage they buy; used for the
/// overflow caregivers in large regular groups.
const WEEKEND_FIRST_STARTS: [Weekday; 7] = [
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
  Weekday::Mon,
  Weekday::Tue,
];

/// Hand-ranked window library for high-acuity houses. Thu/Wed/Fri starts all
/// cover both weekend days; the tail keeps the early week from starving.
const HIGH_ACUITY_STARTS: [Weekday; 7] = [
  Weekday::Thu,
  Weekday::Wed,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Tue,
  Weekday::Sun,
  Weekday::Mon,
];

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PatternPlan {
  pub caregiver_id: Uuid,
  pub work_days:    DayPattern,
}

/// A (house, shift, weekday) cell left under its present-staff floor after
/// the repair pass. Surfaced in the generation report, never silently
/// accepted.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CoverageWarning {
  pub house_id: Uuid,
  pub shift:    Shift,
  pub weekday:  Weekday,
  pub staffed:  usize,
  pub floor:    usize,
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// Assign a day pattern to every caregiver of one house/shift group.
pub fn assign_patterns(
  house: &House,
  shift: Shift,
  caregivers: &[Uuid],
  cfg: &EngineConfig,
) -> (Vec<PatternPlan>, Vec<CoverageWarning>) {
  if caregivers.is_empty() {
    return (Vec::new(), Vec::new());
  }

  let mut plans: Vec<PatternPlan> = if house.high_acuity {
    caregivers
      .iter()
      .enumerate()
      .map(|(i, cg)| PatternPlan {
        caregiver_id: *cg,
        work_days:    DayPattern::window(HIGH_ACUITY_STARTS[i % 7]),
      })
      .collect()
  } else if caregivers.len() >= 7 {
    // One anchor per weekday guarantees full-week coverage; overflow layers
    // on in weekend-first order.
    caregivers
      .iter()
      .enumerate()
      .map(|(i, cg)| {
        let start = if i < 7 {
          ALL_DAYS[i]
        } else {
          WEEKEND_FIRST_STARTS[(i - 7) % 7]
        };
        PatternPlan { caregiver_id: *cg, work_days: DayPattern::window(start) }
      })
      .collect()
  } else {
    greedy_windows(caregivers)
  };

  let floor = cfg.cell_floor(house.high_acuity);
  repair(&mut plans, floor);

  let warnings = validate(house, shift, &plans, floor);
  (plans, warnings)
}

/// Score all seven windows for each caregiver in turn, picking whichever
/// covers the most currently-uncovered days; weekend density breaks ties.
fn greedy_windows(caregivers: &[Uuid]) -> Vec<PatternPlan> {
  let mut coverage = [0usize; 7];
  let mut plans = Vec::with_capacity(caregivers.len());

  for cg in caregivers {
    let mut best: Option<(DayPattern, (usize, usize, std::cmp::Reverse<usize>))> =
      None;
    for start in ALL_DAYS {
      let candidate = DayPattern::window(start);
      let newly = candidate
        .days()
        .iter()
        .filter(|d| coverage[day_index(**d)] == 0)
        .count();
      let weekend = candidate.weekend_days();
      let load: usize =
        candidate.days().iter().map(|d| coverage[day_index(*d)]).sum();
      let key = (newly, weekend, std::cmp::Reverse(load));
      if best.as_ref().is_none_or(|(_, k)| key > *k) {
        best = Some((candidate, key));
      }
    }

    let (pattern, _) = best.expect("seven candidate windows");
    for day in pattern.days() {
      coverage[day_index(*day)] += 1;
    }
    plans.push(PatternPlan { caregiver_id: *cg, work_days: pattern });
  }

  plans
}

/// Swap-repair pass: pull one day out of an over-covered pattern into any
/// weekday still below `floor`. A donor day is only tapped while it stays at
/// or above the floor itself, so repairs never create new deficits.
fn repair(plans: &mut [PatternPlan], floor: usize) {
  let mut coverage = coverage_of(plans);

  for day in ALL_DAYS {
    while coverage[day_index(day)] < floor {
      let Some((plan_idx, donor_day)) = find_donor(plans, &coverage, floor, day)
      else {
        break;
      };
      plans[plan_idx].work_days.swap(donor_day, day);
      coverage[day_index(donor_day)] -= 1;
      coverage[day_index(day)] += 1;
    }
  }
}

/// A (plan, day) pair whose removal keeps the donor day at or above the
/// floor. Prefers the most over-covered day.
fn find_donor(
  plans: &[PatternPlan],
  coverage: &[usize; 7],
  floor: usize,
  deficit_day: Weekday,
) -> Option<(usize, Weekday)> {
  let mut best: Option<(usize, Weekday, usize)> = None;
  for (i, plan) in plans.iter().enumerate() {
    if plan.work_days.works(deficit_day) {
      continue;
    }
    for day in plan.work_days.days() {
      let c = coverage[day_index(*day)];
      if c > floor && best.as_ref().is_none_or(|(_, _, bc)| c > *bc) {
        best = Some((i, *day, c));
      }
    }
  }
  best.map(|(i, d, _)| (i, d))
}

fn validate(
  house: &House,
  shift: Shift,
  plans: &[PatternPlan],
  floor: usize,
) -> Vec<CoverageWarning> {
  let coverage = coverage_of(plans);
  let mut warnings = Vec::new();
  for day in ALL_DAYS {
    let staffed = coverage[day_index(day)];
    if staffed < floor {
      tracing::warn!(
        house = %house.name,
        ?shift,
        ?day,
        staffed,
        floor,
        "weekday below staffing floor after repair pass"
      );
      warnings.push(CoverageWarning {
        house_id: house.house_id,
        shift,
        weekday: day,
        staffed,
        floor,
      });
    }
  }
  warnings
}

fn coverage_of(plans: &[PatternPlan]) -> [usize; 7] {
  let mut coverage = [0usize; 7];
  for plan in plans {
    for day in plan.work_days.days() {
      coverage[day_index(*day)] += 1;
    }
  }
  coverage
}

pub(crate) fn day_index(day: Weekday) -> usize {
  day.num_days_from_monday() as usize
}

// ─── Tests ───────────────────────────────────────────────────────────────────
