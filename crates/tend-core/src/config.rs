//! Engine configuration.
//!
//! Every staffing constant lives here and is passed into each component
//! explicitly, so tests can vary house counts, weights, and floors without
//! touching call sites.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Minimum caregivers targeted per house before the weighted surplus is
  /// distributed. Guarantees enough staff for daily coverage.
  pub house_floor: usize,

  /// Proportional split of a house's caregivers across the three shifts,
  /// in [`crate::schedule::Shift::ALL`] order.
  pub shift_weights: [u32; 3],

  /// Per-shift minimum enforced in high-acuity houses once the house has
  /// received at least `high_acuity_staff_threshold` caregivers.
  pub high_acuity_shift_floor:     usize,
  pub high_acuity_staff_threshold: usize,

  /// Present-staff floor per (house, shift, weekday) cell, used by pattern
  /// validation and integrator scoring.
  pub coverage_floor:             usize,
  /// Raised floor for high-acuity houses.
  pub high_acuity_coverage_floor: usize,

  /// Maximum rows per store write; long write sequences are chunked to
  /// respect store-side transaction-size limits.
  pub batch_size: usize,

  /// Seed for the generation RNG. `None` seeds from entropy; tests fix it
  /// for reproducible schedules.
  pub seed: Option<u64>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      house_floor:                 7,
      shift_weights:               [2, 2, 1],
      high_acuity_shift_floor:     2,
      high_acuity_staff_threshold: 6,
      coverage_floor:              1,
      high_acuity_coverage_floor:  2,
      batch_size:                  200,
      seed:                        None,
    }
  }
}

impl EngineConfig {
  /// The present-staff floor for a house's cells.
  pub fn cell_floor(&self, high_acuity: bool) -> usize {
    if high_acuity {
      self.high_acuity_coverage_floor
    } else {
      self.coverage_floor
    }
  }
}
