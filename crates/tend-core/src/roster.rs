//! Roster entities — caregivers, houses, and care recipients.
//!
//! The engine treats all three as externally owned reference data: it reads
//! whole collections and never mutates them. The store exposes `add_*`
//! methods only so deployments (and tests) can seed rosters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Caregiver ───────────────────────────────────────────────────────────────

/// A member of the caregiving staff. Identity is owned by an external
/// collaborator; the engine only ever reads these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caregiver {
  pub caregiver_id: Uuid,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::ScheduleStore::add_caregiver`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCaregiver {
  pub display_name: String,
}

// ─── House ───────────────────────────────────────────────────────────────────

/// A residential unit. The acuity weight biases its share of the caregiver
/// pool; the `high_acuity` flag additionally raises per-shift staffing floors
/// and skews day patterns toward weekend density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
  pub house_id:      Uuid,
  pub name:          String,
  /// Relative share of the caregiver pool. Higher weight ⇒ more staff.
  pub acuity_weight: u32,
  pub high_acuity:   bool,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::ScheduleStore::add_house`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewHouse {
  pub name:          String,
  pub acuity_weight: u32,
  #[serde(default)]
  pub high_acuity:   bool,
}

// ─── Care recipient ──────────────────────────────────────────────────────────

/// A resident receiving care in one house. Inactive recipients are kept for
/// history but excluded from distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareRecipient {
  pub recipient_id: Uuid,
  pub house_id:     Uuid,
  pub display_name: String,
  pub active:       bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::ScheduleStore::add_recipient`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewCareRecipient {
  pub house_id:     Uuid,
  pub display_name: String,
}
