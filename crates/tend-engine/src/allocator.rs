//! House/shift allocator — partitions the caregiver pool across houses
//! (weighted by acuity) and, within each house, across the fixed three-shift
//! structure.
//!
//! Construction is greedy with explicit priority rules: houses are processed
//! in descending acuity weight so high-acuity houses fill first, and a
//! caregiver whose previous generation placed them in the same house is
//! skipped and requeued once before being force-assigned.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::{Rng, seq::SliceRandom as _};
use tend_core::{
  config::EngineConfig,
  roster::{Caregiver, House},
  schedule::Shift,
};
use uuid::Uuid;

// ─── Output ──────────────────────────────────────────────────────────────────

/// Caregivers placed into one shift of one house, in draw order.
#[derive(Debug, Clone)]
pub struct ShiftGroup {
  pub shift:      Shift,
  pub caregivers: Vec<Uuid>,
}

/// One house's slice of the pool, split across shifts.
#[derive(Debug, Clone)]
pub struct HousePlan {
  pub house_id: Uuid,
  pub shifts:   Vec<ShiftGroup>,
}

impl HousePlan {
  pub fn headcount(&self) -> usize {
    self.shifts.iter().map(|g| g.caregivers.len()).sum()
  }
}

// ─── Allocation ──────────────────────────────────────────────────────────────

/// Partition `caregivers` across `houses`.
///
/// `last_house` maps caregiver → house from the immediately preceding
/// generation; repeat placement is avoided best-effort, never as a hard
/// constraint.
pub fn allocate(
  caregivers: &[Caregiver],
  houses: &[House],
  last_house: &HashMap<Uuid, Uuid>,
  cfg: &EngineConfig,
  rng: &mut impl Rng,
) -> Vec<HousePlan> {
  let mut ids: Vec<Uuid> = caregivers.iter().map(|c| c.caregiver_id).collect();
  ids.shuffle(rng);
  let mut pool: VecDeque<Uuid> = ids.into();

  // Descending weight, name as deterministic tie-break.
  let mut ordered: Vec<&House> = houses.iter().collect();
  ordered.sort_by(|a, b| {
    b.acuity_weight
      .cmp(&a.acuity_weight)
      .then_with(|| a.name.cmp(&b.name))
  });

  let targets = house_targets(pool.len(), &ordered, cfg);

  let mut plans = Vec::with_capacity(ordered.len());
  for (house, target) in ordered.iter().zip(targets) {
    let drawn = draw(&mut pool, target, house.house_id, last_house);
    tracing::debug!(
      house = %house.name,
      target,
      drawn = drawn.len(),
      "allocated house"
    );
    plans.push(HousePlan {
      house_id: house.house_id,
      shifts:   split_shifts(house.high_acuity, drawn, cfg),
    });
  }

  // Weighted targets can undershoot when remainders round down; sweep any
  // leftover caregivers into houses in priority order.
  let mut i = 0;
  while let Some(cg) = pool.pop_front() {
    let plan = &mut plans[i % ordered.len()];
    plan.shifts[0].caregivers.push(cg);
    i += 1;
  }

  plans
}

/// Per-house target counts: `max(N / H, house_floor)` plus a
/// largest-remainder share of the surplus, proportional to acuity weight.
/// `houses` must already be in descending weight order.
fn house_targets(n: usize, houses: &[&House], cfg: &EngineConfig) -> Vec<usize> {
  let h = houses.len();
  if h == 0 {
    return Vec::new();
  }

  let base = (n / h).max(cfg.house_floor);
  let mut targets = vec![base; h];

  let extra = n.saturating_sub(base * h);
  if extra == 0 {
    return targets;
  }

  let total_weight: u64 = houses.iter().map(|hs| u64::from(hs.acuity_weight)).sum();
  if total_weight == 0 {
    // All weights zero: spread evenly, front (highest priority) first.
    for (i, t) in targets.iter_mut().enumerate() {
      *t += extra / h + usize::from(i < extra % h);
    }
    return targets;
  }

  let extra64 = extra as u64;
  let mut remainders: Vec<(usize, u64)> = Vec::with_capacity(h);
  let mut assigned = 0usize;
  for (i, house) in houses.iter().enumerate() {
    let w = u64::from(house.acuity_weight);
    let quota = extra64 * w;
    targets[i] += (quota / total_weight) as usize;
    assigned += (quota / total_weight) as usize;
    remainders.push((i, quota % total_weight));
  }

  // Leftover units go to the largest fractional shares; index order breaks
  // ties toward heavier houses.
  remainders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
  for (i, _) in remainders.into_iter().take(extra - assigned) {
    targets[i] += 1;
  }

  targets
}

/// Draw up to `target` caregivers from the front of the pool. A caregiver
/// whose last generation placed them in this same house is requeued once;
/// on second encounter they are taken regardless.
fn draw(
  pool: &mut VecDeque<Uuid>,
  target: usize,
  house_id: Uuid,
  last_house: &HashMap<Uuid, Uuid>,
) -> Vec<Uuid> {
  let mut drawn = Vec::with_capacity(target);
  let mut requeued: HashSet<Uuid> = HashSet::new();

  while drawn.len() < target {
    let Some(cg) = pool.pop_front() else { break };
    let repeat = last_house.get(&cg) == Some(&house_id);
    if repeat && !requeued.contains(&cg) && !pool.is_empty() {
      requeued.insert(cg);
      pool.push_back(cg);
    } else {
      drawn.push(cg);
    }
  }

  drawn
}

/// Split one house's caregivers across the three shifts: a floor pass in
/// shift order, then a largest-remainder split of the rest by
/// `cfg.shift_weights`.
fn split_shifts(
  high_acuity: bool,
  pool: Vec<Uuid>,
  cfg: &EngineConfig,
) -> Vec<ShiftGroup> {
  let n = pool.len();
  let floor = if high_acuity && n >= cfg.high_acuity_staff_threshold {
    cfg.high_acuity_shift_floor
  } else {
    1
  };

  let mut counts = [0usize; 3];
  let mut remaining = n;

  for c in counts.iter_mut() {
    let take = floor.min(remaining);
    *c += take;
    remaining -= take;
  }

  if remaining > 0 {
    let total_w: u64 = cfg.shift_weights.iter().map(|w| u64::from(*w)).sum();
    if total_w == 0 {
      counts[0] += remaining;
    } else {
      let rem64 = remaining as u64;
      let mut assigned = 0usize;
      let mut fracs: Vec<(usize, u64)> = Vec::with_capacity(3);
      for (i, w) in cfg.shift_weights.iter().enumerate() {
        let quota = rem64 * u64::from(*w);
        counts[i] += (quota / total_w) as usize;
        assigned += (quota / total_w) as usize;
        fracs.push((i, quota % total_w));
      }
      fracs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
      for (i, _) in fracs.into_iter().take(remaining - assigned) {
        counts[i] += 1;
      }
    }
  }

  let mut iter = pool.into_iter();
  Shift::ALL
    .into_iter()
    .zip(counts)
    .map(|(shift, count)| ShiftGroup {
      shift,
      caregivers: iter.by_ref().take(count).collect(),
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use rand::SeedableRng as _;
  use rand_chacha::ChaCha8Rng;

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

  fn house(name: &str, weight: u32, high: bool) -> House {
    House {
      house_id:      Uuid::new_v4(),
      name:          name.into(),
      acuity_weight: weight,
      high_acuity:   high,
      created_at:    Utc::now(),
    }
  }

  fn rng() -> ChaCha8Rng { ChaCha8Rng::seed_from_u64(7) }

  #[test]
  fn every_caregiver_is_placed_exactly_once() {
    let cgs = caregivers(25);
    let houses = vec![house("a", 3, true), house("b", 1, false), house("c", 1, false)];
    let plans = allocate(&cgs, &houses, &HashMap::new(), &EngineConfig::default(), &mut rng());

    let mut placed: Vec<Uuid> = plans
      .iter()
      .flat_map(|p| p.shifts.iter().flat_map(|g| g.caregivers.iter().copied()))
      .collect();
    placed.sort();
    placed.dedup();
    assert_eq!(placed.len(), 25);
  }

  #[test]
  fn heavier_house_gets_at_least_its_even_share() {
    let cgs = caregivers(30);
    let houses = vec![house("heavy", 4, true), house("light", 1, false)];
    let plans = allocate(&cgs, &houses, &HashMap::new(), &EngineConfig::default(), &mut rng());

    // Houses are returned in descending weight order.
    assert!(plans[0].headcount() >= plans[1].headcount());
    assert_eq!(plans[0].headcount() + plans[1].headcount(), 30);
  }

  #[test]
  fn high_acuity_shift_floor_holds_with_enough_staff() {
    let cgs = caregivers(9);
    let houses = vec![house("only", 2, true)];
    let plans = allocate(&cgs, &houses, &HashMap::new(), &EngineConfig::default(), &mut rng());

    for group in &plans[0].shifts {
      assert!(
        group.caregivers.len() >= 2,
        "shift {:?} under floor: {}",
        group.shift,
        group.caregivers.len()
      );
    }
  }

  #[test]
  fn repeat_placement_is_avoided_when_possible() {
    let cgs = caregivers(8);
    let houses = vec![house("a", 1, false), house("b", 1, false)];
    let cfg = EngineConfig { house_floor: 4, ..Default::default() };

    // Everyone was in house "a" last generation (the higher-priority draw).
    let first = &houses[0];
    let last: HashMap<Uuid, Uuid> = cgs
      .iter()
      .take(4)
      .map(|c| (c.caregiver_id, first.house_id))
      .collect();

    let plans = allocate(&cgs, &houses, &last, &cfg, &mut rng());
    let a_plan = plans.iter().find(|p| p.house_id == first.house_id).unwrap();
    let repeats = a_plan
      .shifts
      .iter()
      .flat_map(|g| &g.caregivers)
      .filter(|cg| last.contains_key(cg))
      .count();
    // With 4 fresh caregivers available, house "a" should prefer them.
    assert_eq!(repeats, 0);
  }

  #[test]
  fn forced_assignment_when_pool_would_exhaust() {
    let cgs = caregivers(3);
    let houses = vec![house("same", 1, false)];
    let last: HashMap<Uuid, Uuid> =
      cgs.iter().map(|c| (c.caregiver_id, houses[0].house_id)).collect();

    let plans = allocate(&cgs, &houses, &last, &EngineConfig::default(), &mut rng());
    assert_eq!(plans[0].headcount(), 3);
  }

  #[test]
  fn small_pool_fills_shifts_in_order() {
    let groups = split_shifts(false, caregivers(2).iter().map(|c| c.caregiver_id).collect(), &EngineConfig::default());
    assert_eq!(groups[0].caregivers.len(), 1);
    assert_eq!(groups[1].caregivers.len(), 1);
    assert_eq!(groups[2].caregivers.len(), 0);
  }
}
