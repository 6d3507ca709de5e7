//! Handlers for `/emergency` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/emergency/:date` | Needs and donor candidates, read-only |
//! | `POST` | `/emergency/:date/activate` | Body: [`ActivateBody`]; executes relocations |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tend_core::store::ScheduleStore;
use tend_engine::{
  Engine, EmergencyReport,
  emergency::{DonorChoice, EmergencyCheck},
};

use crate::{error::ApiError, operator_or_default};

/// `GET /emergency/:date`
pub async fn check<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<EmergencyCheck>, ApiError> {
  Ok(Json(engine.check_emergency(date).await?))
}

#[derive(Debug, Deserialize)]
pub struct ActivateBody {
  /// Explicit donor selections; emergencies without one fall back to the
  /// largest-surplus donor on the same shift.
  #[serde(default)]
  pub donor_choices: Vec<DonorChoice>,
  pub operator:      Option<String>,
}

/// `POST /emergency/:date/activate`
pub async fn activate<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Path(date): Path<NaiveDate>,
  Json(body): Json<ActivateBody>,
) -> Result<Json<EmergencyReport>, ApiError> {
  let report = engine
    .activate_emergency(
      date,
      body.donor_choices,
      &operator_or_default(body.operator),
    )
    .await?;
  Ok(Json(report))
}
