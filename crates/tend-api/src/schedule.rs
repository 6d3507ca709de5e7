//! Handlers for schedule lifecycle and absence endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/schedule/generate` | Body: [`GenerateBody`]; returns 201 + generation report |
//! | `POST` | `/schedule/clear` | Retires the current generation |
//! | `GET`  | `/schedule/current` | Current version with all its rows |
//! | `POST` | `/assignments/:id/absence` | Body: [`AbsenceBody`]; returns absence report |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tend_core::{
  assignment::CareRecipientAssignment,
  schedule::{ScheduleAssignment, ScheduleVersion},
  store::ScheduleStore,
};
use tend_engine::{AbsenceReport, Engine, generate::GenerationReport};
use uuid::Uuid;

use crate::{error::ApiError, operator_or_default};

// ─── Generate ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub duration_months: u32,
  pub operator:        Option<String>,
}

/// `POST /schedule/generate`
pub async fn generate<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Json(body): Json<GenerateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let report: GenerationReport = engine
    .generate(body.duration_months, &operator_or_default(body.operator))
    .await?;
  Ok((StatusCode::CREATED, Json(report)))
}

// ─── Clear ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ClearBody {
  pub operator: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
  /// The retired version, if a generation was live.
  pub retired: Option<i64>,
}

/// `POST /schedule/clear`
pub async fn clear<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Json(body): Json<ClearBody>,
) -> Result<Json<ClearResponse>, ApiError> {
  let retired = engine
    .clear_schedule(&operator_or_default(body.operator))
    .await?;
  Ok(Json(ClearResponse { retired }))
}

// ─── Current ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CurrentSchedule {
  pub version:               ScheduleVersion,
  pub assignments:           Vec<ScheduleAssignment>,
  pub recipient_assignments: Vec<CareRecipientAssignment>,
}

/// `GET /schedule/current`
pub async fn current<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
) -> Result<Json<CurrentSchedule>, ApiError> {
  let store = engine.store();
  let version = store
    .current_version()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("no current schedule".into()))?;

  let assignments = store
    .list_schedule_assignments(version.version)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let recipient_assignments = store
    .list_recipient_assignments(version.version)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(CurrentSchedule { version, assignments, recipient_assignments }))
}

// ─── Absence ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AbsenceBody {
  pub date:     NaiveDate,
  pub operator: Option<String>,
}

/// `POST /assignments/:id/absence`
pub async fn mark_absence<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AbsenceBody>,
) -> Result<Json<AbsenceReport>, ApiError> {
  let report = engine
    .mark_absent(id, body.date, &operator_or_default(body.operator))
    .await?;
  Ok(Json(report))
}
