//! The base schedule — shifts, day patterns, assignments, and versions.
//!
//! Schedule rows are append-only. A regeneration writes a complete new set of
//! rows under the next version number; the previous generation is retired by
//! flipping `is_current`, never by deletion, so every generation remains
//! queryable as history.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All seven weekdays, Monday first. Iteration order is canonical across the
/// engine (coverage maps, round-robin ordering, sqlite encoding).
pub const ALL_DAYS: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
];

pub fn is_weekend(day: Weekday) -> bool {
  matches!(day, Weekday::Sat | Weekday::Sun)
}

// ─── Shift ───────────────────────────────────────────────────────────────────

/// The fixed three-shift structure of a care day.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
  First,
  Second,
  /// Overnight presence shift; carries no direct-care duties, so it never
  /// receives care-recipient assignments.
  Night,
}

impl Shift {
  pub const ALL: [Shift; 3] = [Shift::First, Shift::Second, Shift::Night];

  /// Shifts that receive care-recipient assignments.
  pub const DIRECT_CARE: [Shift; 2] = [Shift::First, Shift::Second];

  pub fn direct_care(self) -> bool { !matches!(self, Shift::Night) }
}

// ─── Day pattern ─────────────────────────────────────────────────────────────

/// A caregiver's five work weekdays out of seven.
///
/// Patterns are constructed as consecutive wrap-around windows, but the
/// zero-coverage repair pass may swap a single day out, so the explicit day
/// set is the stored form. Days are kept in [`ALL_DAYS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPattern {
  days: Vec<Weekday>,
}

impl DayPattern {
  /// The consecutive five-day window starting at `start` (wrap-around).
  pub fn window(start: Weekday) -> Self {
    let mut day = start;
    let mut days = Vec::with_capacity(5);
    for _ in 0..5 {
      days.push(day);
      day = day.succ();
    }
    Self::from_days(days)
  }

  /// Build from an arbitrary set of five distinct weekdays.
  pub fn from_days(mut days: Vec<Weekday>) -> Self {
    debug_assert_eq!(days.len(), 5);
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    Self { days }
  }

  pub fn days(&self) -> &[Weekday] { &self.days }

  pub fn works(&self, day: Weekday) -> bool { self.days.contains(&day) }

  /// Number of weekend days (Sat/Sun) in the pattern.
  pub fn weekend_days(&self) -> usize {
    self.days.iter().filter(|d| is_weekend(**d)).count()
  }

  /// Replace `out` with `into`; used by the coverage repair pass.
  /// No-op if `out` is not worked or `into` already is.
  pub fn swap(&mut self, out: Weekday, into: Weekday) {
    if self.works(out) && !self.works(into) {
      self.days.retain(|d| *d != out);
      self.days.push(into);
      self.days.sort_by_key(|d| d.num_days_from_monday());
    }
  }
}

// ─── Schedule assignment ─────────────────────────────────────────────────────

/// One caregiver's placement for one generation: a house, a shift, and a day
/// pattern, valid over the generation's window.
///
/// Within a single version a caregiver appears in at most one house/shift
/// combination. Rows are mutated only by absence marking (`absent_on`) and
/// version retirement (`is_current`); they are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleAssignment {
  pub assignment_id: Uuid,
  pub caregiver_id:  Uuid,
  pub house_id:      Uuid,
  pub shift:         Shift,
  pub work_days:     DayPattern,
  pub version:       i64,
  pub valid_from:    NaiveDate,
  pub valid_until:   NaiveDate,
  pub is_current:    bool,
  /// Set by the absence handler for one concrete calendar date. The date-keyed
  /// temporary reassignments remain the authoritative per-date record.
  pub absent_on:     Option<NaiveDate>,
}

impl ScheduleAssignment {
  /// Whether the caregiver is scheduled to work on `date`'s weekday.
  pub fn works_on(&self, date: NaiveDate) -> bool {
    self.work_days.works(weekday_of(date))
  }

  /// Scheduled to work and not marked absent for `date`.
  pub fn present_on(&self, date: NaiveDate) -> bool {
    self.works_on(date) && self.absent_on != Some(date)
  }
}

pub fn weekday_of(date: NaiveDate) -> Weekday {
  use chrono::Datelike as _;
  date.weekday()
}

// ─── Version ─────────────────────────────────────────────────────────────────

/// One complete regeneration of the base schedule. Version numbers increase
/// monotonically; exactly one version is current for live scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleVersion {
  pub version:     i64,
  pub created_at:  DateTime<Utc>,
  pub valid_from:  NaiveDate,
  pub valid_until: NaiveDate,
  pub is_current:  bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn window_wraps_around_the_week() {
    let p = DayPattern::window(Weekday::Sat);
    assert!(p.works(Weekday::Sat));
    assert!(p.works(Weekday::Sun));
    assert!(p.works(Weekday::Mon));
    assert!(p.works(Weekday::Tue));
    assert!(p.works(Weekday::Wed));
    assert!(!p.works(Weekday::Thu));
    assert_eq!(p.weekend_days(), 2);
  }

  #[test]
  fn swap_moves_a_single_day() {
    let mut p = DayPattern::window(Weekday::Mon); // Mon..Fri
    p.swap(Weekday::Mon, Weekday::Sun);
    assert!(!p.works(Weekday::Mon));
    assert!(p.works(Weekday::Sun));
    assert_eq!(p.days().len(), 5);
  }

  #[test]
  fn swap_is_noop_when_target_already_worked() {
    let mut p = DayPattern::window(Weekday::Mon);
    p.swap(Weekday::Mon, Weekday::Fri);
    assert!(p.works(Weekday::Mon));
    assert_eq!(p.days().len(), 5);
  }
}
