//! [`Engine`] — wires the pure planners to a [`ScheduleStore`].
//!
//! Every operation is a function of current store state plus explicit
//! parameters: read whole collections, plan in memory, then write in bounded
//! batches. Generation writes everything under the new version number first
//! and flips currency in one final pass, so readers filtering by the current
//! version never observe a mixed state. Patch operations (absence, emergency,
//! integration) are idempotent and never create a new version.

use std::{collections::HashMap, sync::Arc};

use chrono::{Months, NaiveDate, Utc};
use rand::SeedableRng as _;
use rand_chacha::ChaCha8Rng;
use tend_core::{
  activity::{ActivityKind, NewActivityEvent},
  config::EngineConfig,
  roster::Caregiver,
  schedule::{ScheduleAssignment, ScheduleVersion, Shift},
  store::ScheduleStore,
};
use uuid::Uuid;

use crate::{
  absence,
  emergency::{self, DonorChoice, EmergencyCell, EmergencyCheck, Relocation},
  error::{Error, Result},
  generate::{self, GenerationReport},
  integrator::{self, Placement, PlacementCandidate},
};

// ─── Reports ─────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
pub struct AbsenceReport {
  pub assignment_id: Uuid,
  pub caregiver_id:  Uuid,
  pub date:          NaiveDate,
  pub moved:         usize,
  pub peers:         usize,
  pub revoked:       usize,
  /// True when no peer could absorb the caseload — the trigger for
  /// [`Engine::check_emergency`].
  pub uncovered:     bool,
}

#[derive(Debug, serde::Serialize)]
pub struct EmergencyReport {
  pub date:        NaiveDate,
  pub relocations: Vec<Relocation>,
  pub unresolved:  Vec<EmergencyCell>,
  pub created:     usize,
  pub revoked:     usize,
}

#[derive(Debug, serde::Serialize)]
pub struct IntegrationReport {
  pub assignment_id:    Uuid,
  pub caregiver_id:     Uuid,
  pub house_id:         Uuid,
  pub shift:            Shift,
  pub cells_recomputed: usize,
  pub rows_created:     usize,
  pub rows_retired:     usize,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The scheduling engine, generic over its store backend.
///
/// Cloning is cheap — the store is reference-counted.
pub struct Engine<S> {
  store: Arc<S>,
  cfg:   EngineConfig,
}

impl<S> Clone for Engine<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), cfg: self.cfg.clone() }
  }
}

impl<S: ScheduleStore> Engine<S> {
  pub fn new(store: Arc<S>, cfg: EngineConfig) -> Self { Self { store, cfg } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> &EngineConfig { &self.cfg }

  // ── Generation ────────────────────────────────────────────────────────

  /// Run a full regeneration valid for `duration_months` from today.
  pub async fn generate(
    &self,
    duration_months: u32,
    operator: &str,
  ) -> Result<GenerationReport> {
    if !(1..=12).contains(&duration_months) {
      return Err(tend_core::Error::InvalidDuration(duration_months).into());
    }

    let caregivers =
      self.store.list_caregivers().await.map_err(Error::store)?;
    if caregivers.is_empty() {
      return Err(tend_core::Error::EmptyRoster("no caregivers").into());
    }
    let houses = self.store.list_houses().await.map_err(Error::store)?;
    if houses.is_empty() {
      return Err(tend_core::Error::EmptyRoster("no houses").into());
    }
    let recipients =
      self.store.list_recipients(true).await.map_err(Error::store)?;

    // Previous placements discourage repeat assignment to the same house.
    let latest =
      self.store.latest_version_number().await.map_err(Error::store)?;
    let last_house: HashMap<Uuid, Uuid> = if latest > 0 {
      self
        .store
        .list_schedule_assignments(latest)
        .await
        .map_err(Error::store)?
        .into_iter()
        .map(|a| (a.caregiver_id, a.house_id))
        .collect()
    } else {
      HashMap::new()
    };

    let valid_from = Utc::now().date_naive();
    let valid_until = valid_from + Months::new(duration_months);
    let version = self
      .store
      .create_version(latest + 1, valid_from, valid_until)
      .await
      .map_err(Error::store)?;

    let mut rng =
      ChaCha8Rng::seed_from_u64(self.cfg.seed.unwrap_or_else(rand::random));
    let plan = generate::plan_generation(
      &caregivers,
      &houses,
      &recipients,
      &last_house,
      &version,
      &self.cfg,
      &mut rng,
    );

    // All rows land under the not-yet-current version; a mid-write failure
    // leaves the previous generation untouched and fully readable.
    for chunk in plan.assignments.chunks(self.cfg.batch_size) {
      self
        .store
        .insert_schedule_assignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }
    for chunk in plan.recipient_rows.chunks(self.cfg.batch_size) {
      self
        .store
        .insert_recipient_assignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }
    self
      .store
      .activate_version(version.version)
      .await
      .map_err(Error::store)?;

    let report = GenerationReport {
      version:             version.version,
      caregivers_assigned: plan.assignments.len(),
      recipient_rows:      plan.recipient_rows.len(),
      warnings:            plan.warnings,
      gap_repairs:         plan.gap_repairs,
      unassigned:          plan.unassigned,
    };

    self
      .log(
        operator,
        ActivityKind::Generated,
        format!(
          "generated version {} ({} caregivers, {} recipient rows, {} warnings)",
          report.version,
          report.caregivers_assigned,
          report.recipient_rows,
          report.warnings.len()
        ),
      )
      .await?;

    Ok(report)
  }

  /// Retire the current generation without a successor.
  pub async fn clear_schedule(&self, operator: &str) -> Result<Option<i64>> {
    let retired =
      self.store.retire_current_version().await.map_err(Error::store)?;
    if let Some(version) = retired {
      self
        .log(
          operator,
          ActivityKind::Cleared,
          format!("retired version {version}"),
        )
        .await?;
    }
    Ok(retired)
  }

  // ── Absence ───────────────────────────────────────────────────────────

  /// Mark one assignment absent for one concrete date and redistribute its
  /// caseload among same-cell peers for that date.
  pub async fn mark_absent(
    &self,
    assignment_id: Uuid,
    date: NaiveDate,
    operator: &str,
  ) -> Result<AbsenceReport> {
    let version = self.current_version().await?;
    let assignment = self
      .store
      .get_schedule_assignment(assignment_id)
      .await
      .map_err(Error::store)?
      .ok_or(tend_core::Error::AssignmentNotFound(assignment_id))?;
    if !assignment.is_current || assignment.version != version.version {
      return Err(tend_core::Error::StaleAssignment(assignment_id).into());
    }
    if date < version.valid_from || date > version.valid_until {
      return Err(tend_core::Error::DateOutOfWindow { date }.into());
    }

    let all = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?;
    let base = self
      .store
      .list_recipient_assignments(version.version)
      .await
      .map_err(Error::store)?;
    let overrides =
      self.store.list_reassignments(date).await.map_err(Error::store)?;

    let plan = absence::plan_absence(&assignment, &all, &base, &overrides, date);

    for chunk in plan.revoke.chunks(self.cfg.batch_size) {
      self
        .store
        .revoke_reassignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }
    self
      .store
      .mark_assignment_absent(assignment_id, date)
      .await
      .map_err(Error::store)?;
    for chunk in plan.create.chunks(self.cfg.batch_size) {
      self
        .store
        .insert_reassignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }

    let report = AbsenceReport {
      assignment_id,
      caregiver_id: plan.caregiver_id,
      date,
      moved: plan.create.len(),
      peers: plan.peer_count,
      revoked: plan.revoke.len(),
      uncovered: plan.uncovered,
    };

    self
      .log(
        operator,
        ActivityKind::AbsenceMarked,
        format!(
          "caregiver {} absent {}: {} recipients moved to {} peers{}",
          report.caregiver_id,
          report.date,
          report.moved,
          report.peers,
          if report.uncovered { " (NO COVERAGE)" } else { "" }
        ),
      )
      .await?;

    Ok(report)
  }

  // ── Emergency ─────────────────────────────────────────────────────────

  /// Recompute present-vs-absent headcounts for `date` and report emergency
  /// cells with donor candidates. Read-only.
  pub async fn check_emergency(&self, date: NaiveDate) -> Result<EmergencyCheck> {
    let version = self.current_version().await?;
    let all = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?;
    Ok(emergency::check(&all, date))
  }

  /// Resolve every emergency on `date` by relocating donors; unresolved
  /// cells are surfaced in the report.
  pub async fn activate_emergency(
    &self,
    date: NaiveDate,
    choices: Vec<DonorChoice>,
    operator: &str,
  ) -> Result<EmergencyReport> {
    let version = self.current_version().await?;
    let all = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?;
    let snapshot = emergency::check(&all, date);

    let recipients =
      self.store.list_recipients(true).await.map_err(Error::store)?;
    let base = self
      .store
      .list_recipient_assignments(version.version)
      .await
      .map_err(Error::store)?;
    let overrides =
      self.store.list_reassignments(date).await.map_err(Error::store)?;

    let plan = emergency::plan_emergency(
      &snapshot,
      &recipients,
      &base,
      &overrides,
      version.version,
      &choices,
    );

    for chunk in plan.revoke.chunks(self.cfg.batch_size) {
      self
        .store
        .revoke_reassignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }
    for chunk in plan.create.chunks(self.cfg.batch_size) {
      self
        .store
        .insert_reassignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }

    let report = EmergencyReport {
      date,
      created: plan.create.len(),
      revoked: plan.revoke.len(),
      relocations: plan.relocations,
      unresolved: plan.unresolved,
    };

    self
      .log(
        operator,
        ActivityKind::EmergencyActivated,
        format!(
          "emergency {}: {} relocations, {} unresolved",
          report.date,
          report.relocations.len(),
          report.unresolved.len()
        ),
      )
      .await?;

    Ok(report)
  }

  // ── Integration ───────────────────────────────────────────────────────

  /// Caregivers with no assignment in the current generation.
  pub async fn detect_unassigned(&self) -> Result<Vec<Caregiver>> {
    let version = self.current_version().await?;
    let assigned: Vec<Uuid> = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|a| a.caregiver_id)
      .collect();

    let caregivers =
      self.store.list_caregivers().await.map_err(Error::store)?;
    Ok(
      caregivers
        .into_iter()
        .filter(|c| !assigned.contains(&c.caregiver_id))
        .collect(),
    )
  }

  /// Ranked placement candidates for one unassigned caregiver.
  pub async fn recommend_placement(
    &self,
    caregiver_id: Uuid,
  ) -> Result<Vec<PlacementCandidate>> {
    let version = self.current_version().await?;
    self
      .store
      .get_caregiver(caregiver_id)
      .await
      .map_err(Error::store)?
      .ok_or(tend_core::Error::CaregiverNotFound(caregiver_id))?;

    let houses = self.store.list_houses().await.map_err(Error::store)?;
    let assignments = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?;
    Ok(integrator::recommend(&houses, &assignments, &self.cfg))
  }

  /// Insert the caregiver under the current version and rebalance every
  /// affected coverage cell.
  pub async fn integrate(
    &self,
    caregiver_id: Uuid,
    placement: Placement,
    operator: &str,
  ) -> Result<IntegrationReport> {
    let version = self.current_version().await?;
    self
      .store
      .get_caregiver(caregiver_id)
      .await
      .map_err(Error::store)?
      .ok_or(tend_core::Error::CaregiverNotFound(caregiver_id))?;

    let houses = self.store.list_houses().await.map_err(Error::store)?;
    if !houses.iter().any(|h| h.house_id == placement.house_id) {
      return Err(tend_core::Error::HouseNotFound(placement.house_id).into());
    }

    let assignments = self
      .store
      .list_schedule_assignments(version.version)
      .await
      .map_err(Error::store)?;
    if assignments.iter().any(|a| a.caregiver_id == caregiver_id) {
      return Err(tend_core::Error::AlreadyAssigned(caregiver_id).into());
    }

    let house_assignments: Vec<ScheduleAssignment> = assignments
      .into_iter()
      .filter(|a| a.house_id == placement.house_id)
      .collect();
    let recipients: Vec<_> = self
      .store
      .list_recipients(true)
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|r| r.house_id == placement.house_id)
      .collect();
    let base = self
      .store
      .list_recipient_assignments(version.version)
      .await
      .map_err(Error::store)?;

    let plan = integrator::plan_integration(
      caregiver_id,
      &placement,
      &version,
      &house_assignments,
      &base,
      &recipients,
    );

    let report = IntegrationReport {
      assignment_id:    plan.assignment.assignment_id,
      caregiver_id,
      house_id:         placement.house_id,
      shift:            placement.shift,
      cells_recomputed: plan.cells_recomputed,
      rows_created:     plan.create.len(),
      rows_retired:     plan.retire.len(),
    };

    self
      .store
      .insert_schedule_assignments(vec![plan.assignment])
      .await
      .map_err(Error::store)?;
    for chunk in plan.retire.chunks(self.cfg.batch_size) {
      self
        .store
        .retire_recipient_assignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }
    for chunk in plan.create.chunks(self.cfg.batch_size) {
      self
        .store
        .insert_recipient_assignments(chunk.to_vec())
        .await
        .map_err(Error::store)?;
    }

    self
      .log(
        operator,
        ActivityKind::CaregiverIntegrated,
        format!(
          "caregiver {} integrated into house {} ({:?}), {} cells rebalanced",
          caregiver_id, report.house_id, report.shift, report.cells_recomputed
        ),
      )
      .await?;

    Ok(report)
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn current_version(&self) -> Result<ScheduleVersion> {
    self
      .store
      .current_version()
      .await
      .map_err(Error::store)?
      .ok_or_else(|| tend_core::Error::NoCurrentVersion.into())
  }

  async fn log(
    &self,
    operator: &str,
    kind: ActivityKind,
    summary: String,
  ) -> Result<()> {
    self
      .store
      .log_event(NewActivityEvent {
        operator: operator.to_owned(),
        kind,
        summary,
      })
      .await
      .map_err(Error::store)?;
    Ok(())
  }
}
