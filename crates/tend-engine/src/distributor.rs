//! Care-recipient distributor — for every (house, shift, weekday) cell,
//! assigns every recipient resident in the house to exactly one caregiver
//! present in that cell.
//!
//! One present caregiver absorbs the whole roster; several split it
//! round-robin so loads differ by at most one. The overnight shift carries no
//! direct-care duties and receives nothing. A safety-net pass catches cells
//! with zero present caregivers and spreads their recipients across anyone
//! working the house that day, flagged as cross-shift repairs.

use chrono::Weekday;
use tend_core::{
  assignment::{AssignmentStatus, CareRecipientAssignment},
  roster::{CareRecipient, House},
  schedule::{ALL_DAYS, ScheduleAssignment, Shift},
};
use uuid::Uuid;

// ─── Output ──────────────────────────────────────────────────────────────────

/// A zero-present cell whose recipients were absorbed cross-shift.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GapRepair {
  pub house_id:   Uuid,
  pub shift:      Shift,
  pub weekday:    Weekday,
  pub recipients: usize,
}

/// A cell that could not be repaired: nobody works the house that day.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UnassignedCell {
  pub house_id:   Uuid,
  pub shift:      Shift,
  pub weekday:    Weekday,
  pub recipients: Vec<Uuid>,
}

#[derive(Debug, Default)]
pub struct HouseDistribution {
  pub rows:        Vec<CareRecipientAssignment>,
  pub gap_repairs: Vec<GapRepair>,
  pub unassigned:  Vec<UnassignedCell>,
}

// ─── Distribution ────────────────────────────────────────────────────────────

/// Distribute one house's recipient roster across its assigned caregivers
/// for every weekday and direct-care shift.
///
/// `assignments` must be this house's schedule rows; `recipients` its active
/// roster.
pub fn distribute_house(
  house: &House,
  assignments: &[ScheduleAssignment],
  recipients: &[CareRecipient],
  version: i64,
) -> HouseDistribution {
  let roster = sorted_roster(recipients);
  let mut out = HouseDistribution::default();

  for day in ALL_DAYS {
    for shift in Shift::DIRECT_CARE {
      let present: Vec<Uuid> = assignments
        .iter()
        .filter(|a| a.shift == shift && a.work_days.works(day))
        .map(|a| a.caregiver_id)
        .collect();

      if !present.is_empty() {
        out
          .rows
          .extend(distribute_cell(&present, &roster, day, shift, version, false));
        continue;
      }
      if roster.is_empty() {
        continue;
      }

      // Safety net: nobody present in this cell. Spread across any caregiver
      // working the house that day, regardless of shift.
      let any_working: Vec<Uuid> = assignments
        .iter()
        .filter(|a| a.work_days.works(day))
        .map(|a| a.caregiver_id)
        .collect();

      if any_working.is_empty() {
        tracing::warn!(
          house = %house.name, ?shift, ?day,
          "no caregiver works this house on this day; recipients unassigned"
        );
        out.unassigned.push(UnassignedCell {
          house_id:   house.house_id,
          shift,
          weekday:    day,
          recipients: roster.iter().map(|r| r.recipient_id).collect(),
        });
        continue;
      }

      tracing::warn!(
        house = %house.name, ?shift, ?day,
        caregivers = any_working.len(),
        "coverage gap repaired with cross-shift assignment"
      );
      out
        .rows
        .extend(distribute_cell(&any_working, &roster, day, shift, version, true));
      out.gap_repairs.push(GapRepair {
        house_id:   house.house_id,
        shift,
        weekday:    day,
        recipients: roster.len(),
      });
    }
  }

  out
}

/// Round-robin distribution of one cell: recipient `i` goes to caregiver
/// `i % k`, so loads differ by at most one. With `k == 1` the sole caregiver
/// absorbs the entire roster.
pub fn distribute_cell(
  present: &[Uuid],
  roster: &[&CareRecipient],
  weekday: Weekday,
  shift: Shift,
  version: i64,
  cross_shift: bool,
) -> Vec<CareRecipientAssignment> {
  roster
    .iter()
    .enumerate()
    .map(|(i, recipient)| CareRecipientAssignment {
      id: Uuid::new_v4(),
      caregiver_id: present[i % present.len()],
      recipient_id: recipient.recipient_id,
      weekday,
      shift,
      version,
      cross_shift,
      status: AssignmentStatus::Active,
    })
    .collect()
}

/// Name order (id as tie-break) — deterministic input for round-robin.
pub fn sorted_roster(recipients: &[CareRecipient]) -> Vec<&CareRecipient> {
  let mut roster: Vec<&CareRecipient> =
    recipients.iter().filter(|r| r.active).collect();
  roster.sort_by(|a, b| {
    a.display_name
      .cmp(&b.display_name)
      .then_with(|| a.recipient_id.cmp(&b.recipient_id))
  });
  roster
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use chrono::{NaiveDate, Utc};
  use tend_core::schedule::DayPattern;

  use super::*;

  fn house() -> House {
    House {
      house_id:      Uuid::new_v4(),
      name:          "cedar".into(),
      acuity_weight: 1,
      high_acuity:   false,
      created_at:    Utc::now(),
    }
  }

  fn assignment(house_id: Uuid, shift: Shift, start: Weekday) -> ScheduleAssignment {
    ScheduleAssignment {
      assignment_id: Uuid::new_v4(),
      caregiver_id: Uuid::new_v4(),
      house_id,
      shift,
      work_days: DayPattern::window(start),
      version: 1,
      valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      valid_until: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
      is_current: true,
      absent_on: None,
    }
  }

  fn recipients(house_id: Uuid, n: usize) -> Vec<CareRecipient> {
    (0..n)
      .map(|i| CareRecipient {
        recipient_id: Uuid::new_v4(),
        house_id,
        display_name: format!("resident {i:02}"),
        active:       true,
        created_at:   Utc::now(),
      })
      .collect()
  }

  #[test]
  fn lone_caregiver_absorbs_whole_roster() {
    let h = house();
    let a = assignment(h.house_id, Shift::First, Weekday::Mon);
    let rs = recipients(h.house_id, 4);

    let out = distribute_house(&h, std::slice::from_ref(&a), &rs, 1);
    let monday_first: Vec<_> = out
      .rows
      .iter()
      .filter(|r| r.weekday == Weekday::Mon && r.shift == Shift::First)
      .collect();
    assert_eq!(monday_first.len(), 4);
    assert!(monday_first.iter().all(|r| r.caregiver_id == a.caregiver_id));
  }

  #[test]
  fn round_robin_loads_differ_by_at_most_one() {
    let h = house();
    let assignments = vec![
      assignment(h.house_id, Shift::First, Weekday::Mon),
      assignment(h.house_id, Shift::First, Weekday::Mon),
      assignment(h.house_id, Shift::First, Weekday::Mon),
    ];
    let rs = recipients(h.house_id, 8);

    let out = distribute_house(&h, &assignments, &rs, 1);
    let cell: Vec<_> = out
      .rows
      .iter()
      .filter(|r| r.weekday == Weekday::Wed && r.shift == Shift::First)
      .collect();
    assert_eq!(cell.len(), 8);

    let mut loads: HashMap<Uuid, usize> = HashMap::new();
    for row in &cell {
      *loads.entry(row.caregiver_id).or_default() += 1;
    }
    let max = loads.values().max().unwrap();
    let min = loads.values().min().unwrap();
    assert!(max - min <= 1, "loads: {loads:?}");

    // No recipient appears twice in one cell.
    let mut seen: Vec<Uuid> = cell.iter().map(|r| r.recipient_id).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 8);
  }

  #[test]
  fn night_shift_receives_no_recipients() {
    let h = house();
    let a = assignment(h.house_id, Shift::Night, Weekday::Mon);
    let rs = recipients(h.house_id, 3);

    let out = distribute_house(&h, std::slice::from_ref(&a), &rs, 1);
    assert!(out.rows.iter().all(|r| r.shift != Shift::Night));
  }

  #[test]
  fn zero_present_cell_is_repaired_cross_shift() {
    let h = house();
    // Only a second-shift caregiver; first shift has nobody all week.
    let a = assignment(h.house_id, Shift::Second, Weekday::Mon);
    let rs = recipients(h.house_id, 2);

    let out = distribute_house(&h, std::slice::from_ref(&a), &rs, 1);
    let repaired: Vec<_> = out
      .rows
      .iter()
      .filter(|r| r.shift == Shift::First && r.weekday == Weekday::Mon)
      .collect();
    assert_eq!(repaired.len(), 2);
    assert!(repaired.iter().all(|r| r.cross_shift));
    assert!(!out.gap_repairs.is_empty());
  }

  #[test]
  fn day_without_any_staff_is_reported_unassigned() {
    let h = house();
    let a = assignment(h.house_id, Shift::First, Weekday::Mon); // Mon..Fri
    let rs = recipients(h.house_id, 2);

    let out = distribute_house(&h, std::slice::from_ref(&a), &rs, 1);
    assert!(
      out
        .unassigned
        .iter()
        .any(|u| u.weekday == Weekday::Sat || u.weekday == Weekday::Sun)
    );
  }

  #[test]
  fn inactive_recipients_are_skipped() {
    let h = house();
    let a = assignment(h.house_id, Shift::First, Weekday::Mon);
    let mut rs = recipients(h.house_id, 3);
    rs[0].active = false;

    let out = distribute_house(&h, std::slice::from_ref(&a), &rs, 1);
    assert!(
      out.rows.iter().all(|r| r.recipient_id != rs[0].recipient_id)
    );
  }
}
