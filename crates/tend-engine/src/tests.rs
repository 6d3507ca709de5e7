//! End-to-end tests driving [`Engine`] against an in-memory SQLite store.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use tend_core::{
  activity::ActivityKind,
  assignment::{AssignmentStatus, CareRecipientAssignment, ReassignReason},
  config::EngineConfig,
  roster::{NewCareRecipient, NewCaregiver, NewHouse},
  schedule::{DayPattern, ScheduleAssignment, Shift},
  store::ScheduleStore,
};
use tend_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{Engine, Error, integrator::Placement};

async fn engine() -> Engine<SqliteStore> {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let cfg = EngineConfig { seed: Some(7), ..EngineConfig::default() };
  Engine::new(Arc::new(store), cfg)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A Monday inside the manually seeded validity window.
fn monday() -> NaiveDate { date(2026, 3, 2) }

fn mon_assignment(
  caregiver_id: Uuid,
  house_id: Uuid,
  shift: Shift,
  version: i64,
) -> ScheduleAssignment {
  ScheduleAssignment {
    assignment_id: Uuid::new_v4(),
    caregiver_id,
    house_id,
    shift,
    work_days: DayPattern::window(Weekday::Mon),
    version,
    valid_from: date(2026, 1, 1),
    valid_until: date(2026, 7, 1),
    is_current: true,
    absent_on: None,
  }
}

fn base_row(
  caregiver_id: Uuid,
  recipient_id: Uuid,
  shift: Shift,
) -> CareRecipientAssignment {
  CareRecipientAssignment {
    id: Uuid::new_v4(),
    caregiver_id,
    recipient_id,
    weekday: Weekday::Mon,
    shift,
    version: 1,
    cross_shift: false,
    status: AssignmentStatus::Active,
  }
}

/// Seed one house with `staff` first-shift caregivers (all on the Mon..Fri
/// window) and `residents` recipients bound round-robin for Monday.
async fn seed_cell(
  e: &Engine<SqliteStore>,
  staff: usize,
  residents: usize,
) -> (Uuid, Vec<ScheduleAssignment>, Vec<Uuid>) {
  let s = e.store();
  let house = s
    .add_house(NewHouse {
      name:          format!("house-{}", Uuid::new_v4()),
      acuity_weight: 1,
      high_acuity:   false,
    })
    .await
    .unwrap();

  let mut assignments = Vec::new();
  for i in 0..staff {
    let cg = s
      .add_caregiver(NewCaregiver { display_name: format!("cg-{i}") })
      .await
      .unwrap();
    assignments.push(mon_assignment(
      cg.caregiver_id,
      house.house_id,
      Shift::First,
      1,
    ));
  }
  s.insert_schedule_assignments(assignments.clone()).await.unwrap();

  let mut recipient_ids = Vec::new();
  let mut rows = Vec::new();
  for i in 0..residents {
    let r = s
      .add_recipient(NewCareRecipient {
        house_id:     house.house_id,
        display_name: format!("r-{i}"),
      })
      .await
      .unwrap();
    rows.push(base_row(
      assignments[i % assignments.len()].caregiver_id,
      r.recipient_id,
      Shift::First,
    ));
    recipient_ids.push(r.recipient_id);
  }
  s.insert_recipient_assignments(rows).await.unwrap();

  (house.house_id, assignments, recipient_ids)
}

async fn seed_version(e: &Engine<SqliteStore>) {
  let s = e.store();
  s.create_version(1, date(2026, 1, 1), date(2026, 7, 1))
    .await
    .unwrap();
  s.activate_version(1).await.unwrap();
}

// ─── Generation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_activates_a_new_version() {
  let e = engine().await;
  let s = e.store();
  s.add_house(NewHouse { name: "alder".into(), acuity_weight: 1, high_acuity: false })
    .await
    .unwrap();
  for i in 0..8 {
    s.add_caregiver(NewCaregiver { display_name: format!("cg-{i}") })
      .await
      .unwrap();
  }

  let report = e.generate(6, "ops").await.unwrap();
  assert_eq!(report.version, 1);
  assert_eq!(report.caregivers_assigned, 8);

  let current = s.current_version().await.unwrap().unwrap();
  assert_eq!(current.version, 1);
  assert_eq!(s.list_schedule_assignments(1).await.unwrap().len(), 8);

  let events = s.list_events(5).await.unwrap();
  assert_eq!(events[0].kind, ActivityKind::Generated);
}

#[tokio::test]
async fn regenerate_bumps_version_and_preserves_history() {
  let e = engine().await;
  let s = e.store();
  s.add_house(NewHouse { name: "alder".into(), acuity_weight: 1, high_acuity: false })
    .await
    .unwrap();
  for i in 0..7 {
    s.add_caregiver(NewCaregiver { display_name: format!("cg-{i}") })
      .await
      .unwrap();
  }

  e.generate(6, "ops").await.unwrap();
  let report = e.generate(6, "ops").await.unwrap();
  assert_eq!(report.version, 2);

  assert_eq!(s.current_version().await.unwrap().unwrap().version, 2);

  // The first generation remains queryable, no longer current.
  let old = s.list_schedule_assignments(1).await.unwrap();
  assert_eq!(old.len(), 7);
  assert!(old.iter().all(|a| !a.is_current));
}

#[tokio::test]
async fn generate_rejects_out_of_range_durations() {
  let e = engine().await;
  for months in [0, 13] {
    let err = e.generate(months, "ops").await.unwrap_err();
    assert!(matches!(
      err,
      Error::Core(tend_core::Error::InvalidDuration(m)) if m == months
    ));
  }
}

#[tokio::test]
async fn generate_rejects_an_empty_roster() {
  let e = engine().await;
  let err = e.generate(6, "ops").await.unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::EmptyRoster(_))));
}

#[tokio::test]
async fn clear_schedule_retires_the_generation() {
  let e = engine().await;
  seed_version(&e).await;

  assert_eq!(e.clear_schedule("ops").await.unwrap(), Some(1));
  assert!(e.store().current_version().await.unwrap().is_none());

  // Nothing left to clear.
  assert_eq!(e.clear_schedule("ops").await.unwrap(), None);
}

// ─── Absence ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn absence_redirects_the_caseload_for_one_date() {
  let e = engine().await;
  seed_version(&e).await;
  let (_, staff, _) = seed_cell(&e, 2, 4).await;

  let report = e
    .mark_absent(staff[0].assignment_id, monday(), "ops")
    .await
    .unwrap();
  assert!(!report.uncovered);
  assert_eq!(report.moved, 2);

  let s = e.store();
  let overrides = s.list_reassignments(monday()).await.unwrap();
  assert_eq!(overrides.len(), 2);
  assert!(overrides.iter().all(|o| {
    o.to_caregiver == staff[1].caregiver_id
      && o.reason == ReassignReason::Absence
  }));

  // Only the base row's absent_on changed; no other date is affected.
  let fetched = s
    .get_schedule_assignment(staff[0].assignment_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.absent_on, Some(monday()));
  assert!(s.list_reassignments(date(2026, 3, 3)).await.unwrap().is_empty());
}

#[tokio::test]
async fn absence_with_no_peer_reports_uncovered() {
  let e = engine().await;
  seed_version(&e).await;
  let (_, staff, _) = seed_cell(&e, 1, 2).await;

  let report = e
    .mark_absent(staff[0].assignment_id, monday(), "ops")
    .await
    .unwrap();
  assert!(report.uncovered);
  assert_eq!(report.moved, 0);
  assert!(e.store().list_reassignments(monday()).await.unwrap().is_empty());
}

#[tokio::test]
async fn absence_rejects_assignments_from_retired_versions() {
  let e = engine().await;
  seed_version(&e).await;
  let (_, staff, _) = seed_cell(&e, 2, 2).await;

  let s = e.store();
  s.create_version(2, date(2026, 1, 1), date(2026, 7, 1))
    .await
    .unwrap();
  s.activate_version(2).await.unwrap();

  let err = e
    .mark_absent(staff[0].assignment_id, monday(), "ops")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::StaleAssignment(_))));
}

#[tokio::test]
async fn absence_rejects_dates_outside_the_validity_window() {
  let e = engine().await;
  seed_version(&e).await;
  let (_, staff, _) = seed_cell(&e, 2, 2).await;

  let err = e
    .mark_absent(staff[0].assignment_id, date(2026, 8, 3), "ops")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::DateOutOfWindow { .. })));
}

// ─── Emergency ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn emergency_flow_relocates_a_donor() {
  let e = engine().await;
  seed_version(&e).await;
  // House Y: a single caregiver holding two residents. House Z: two present.
  let (y, y_staff, y_residents) = seed_cell(&e, 1, 2).await;
  let (z, z_staff, _) = seed_cell(&e, 2, 2).await;

  e.mark_absent(y_staff[0].assignment_id, monday(), "ops")
    .await
    .unwrap();

  let snapshot = e.check_emergency(monday()).await.unwrap();
  assert_eq!(snapshot.needs.len(), 1);
  assert_eq!(snapshot.needs[0].house_id, y);

  let report = e.activate_emergency(monday(), vec![], "ops").await.unwrap();
  assert!(report.unresolved.is_empty());
  assert_eq!(report.relocations.len(), 1);
  let reloc = &report.relocations[0];
  assert_eq!(reloc.need_house, y);
  assert_eq!(reloc.donor_house, z);
  assert!(z_staff.iter().any(|a| a.caregiver_id == reloc.mover));

  // Y's residents are now covered by the mover, for this date only.
  let overrides = e.store().list_reassignments(monday()).await.unwrap();
  let covers: Vec<_> = overrides
    .iter()
    .filter(|o| o.reason == ReassignReason::EmergencyCover)
    .collect();
  assert_eq!(covers.len(), 2);
  assert!(covers.iter().all(|o| o.to_caregiver == reloc.mover));
  assert!(covers.iter().all(|o| y_residents.contains(&o.recipient_id)));
}

#[tokio::test]
async fn emergency_without_a_donor_stays_unresolved() {
  let e = engine().await;
  seed_version(&e).await;
  let (y, y_staff, _) = seed_cell(&e, 1, 2).await;

  e.mark_absent(y_staff[0].assignment_id, monday(), "ops")
    .await
    .unwrap();

  let report = e.activate_emergency(monday(), vec![], "ops").await.unwrap();
  assert!(report.relocations.is_empty());
  assert_eq!(report.unresolved.len(), 1);
  assert_eq!(report.unresolved[0].house_id, y);
}

// ─── Integration ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn integration_flow_places_an_unassigned_caregiver() {
  let e = engine().await;
  seed_version(&e).await;
  let (house, _, _) = seed_cell(&e, 1, 3).await;

  let s = e.store();
  let newcomer = s
    .add_caregiver(NewCaregiver { display_name: "newcomer".into() })
    .await
    .unwrap();

  let unassigned = e.detect_unassigned().await.unwrap();
  assert_eq!(unassigned.len(), 1);
  assert_eq!(unassigned[0].caregiver_id, newcomer.caregiver_id);

  let candidates = e.recommend_placement(newcomer.caregiver_id).await.unwrap();
  assert!(!candidates.is_empty());
  assert!(candidates[0].score >= candidates[candidates.len() - 1].score);

  let placement = Placement {
    house_id:  house,
    shift:     Shift::Second,
    work_days: DayPattern::window(Weekday::Mon),
  };
  let report = e
    .integrate(newcomer.caregiver_id, placement.clone(), "ops")
    .await
    .unwrap();
  assert_eq!(report.house_id, house);
  assert_eq!(report.cells_recomputed, 5);

  let rows = s.list_schedule_assignments(1).await.unwrap();
  assert!(rows.iter().any(|a| a.caregiver_id == newcomer.caregiver_id));
  assert!(e.detect_unassigned().await.unwrap().is_empty());

  // A second integration of the same caregiver is refused.
  let err = e
    .integrate(newcomer.caregiver_id, placement, "ops")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::AlreadyAssigned(_))));
}

#[tokio::test]
async fn integration_requires_a_known_caregiver_and_house() {
  let e = engine().await;
  seed_version(&e).await;
  let (house, _, _) = seed_cell(&e, 1, 1).await;

  let placement = Placement {
    house_id:  house,
    shift:     Shift::First,
    work_days: DayPattern::window(Weekday::Mon),
  };
  let err = e
    .integrate(Uuid::new_v4(), placement, "ops")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::CaregiverNotFound(_))));

  let cg = e
    .store()
    .add_caregiver(NewCaregiver { display_name: "drifter".into() })
    .await
    .unwrap();
  let bad_placement = Placement {
    house_id:  Uuid::new_v4(),
    shift:     Shift::First,
    work_days: DayPattern::window(Weekday::Mon),
  };
  let err = e
    .integrate(cg.caregiver_id, bad_placement, "ops")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(tend_core::Error::HouseNotFound(_))));
}
