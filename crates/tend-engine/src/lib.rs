//! The tend allocation and rebalancing engine.
//!
//! Greedy, auditable construction of a full staffing generation (allocator →
//! day-pattern assigner → care-recipient distributor), plus the three
//! incremental patch operations: absence handling, emergency coverage
//! resolution, and new-caregiver integration.
//!
//! The planning layer is pure — functions of rosters, the current schedule,
//! and an injected RNG — and lives in the component modules. [`Engine`] wires
//! those planners to any [`tend_core::store::ScheduleStore`], chunking writes
//! and appending activity-log events.

pub mod absence;
pub mod allocator;
pub mod coverage;
pub mod distributor;
pub mod emergency;
mod engine;
pub mod error;
pub mod generate;
pub mod integrator;
pub mod patterns;

pub use engine::{AbsenceReport, EmergencyReport, Engine, IntegrationReport};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
