//! Handlers for new-caregiver integration endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/caregivers/unassigned` | Caregivers missing from the current generation |
//! | `GET`  | `/caregivers/:id/placements` | Ranked placement candidates |
//! | `POST` | `/caregivers/:id/integrate` | Body: [`IntegrateBody`]; returns 201 + report |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tend_core::{roster::Caregiver, store::ScheduleStore};
use tend_engine::{
  Engine,
  integrator::{Placement, PlacementCandidate},
};
use uuid::Uuid;

use crate::{error::ApiError, operator_or_default};

/// `GET /caregivers/unassigned`
pub async fn unassigned<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
) -> Result<Json<Vec<Caregiver>>, ApiError> {
  Ok(Json(engine.detect_unassigned().await?))
}

/// `GET /caregivers/:id/placements`
pub async fn placements<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlacementCandidate>>, ApiError> {
  Ok(Json(engine.recommend_placement(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct IntegrateBody {
  pub placement: Placement,
  pub operator:  Option<String>,
}

/// `POST /caregivers/:id/integrate`
pub async fn integrate<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<IntegrateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let report = engine
    .integrate(id, body.placement, &operator_or_default(body.operator))
    .await?;
  Ok((StatusCode::CREATED, Json(report)))
}
