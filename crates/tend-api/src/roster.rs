//! Handlers for roster seeding and reading.
//!
//! Rosters are externally owned reference data; these endpoints exist so
//! deployments can seed and inspect them. All creates return 201.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tend_core::{
  roster::{
    Caregiver, CareRecipient, House, NewCareRecipient, NewCaregiver, NewHouse,
  },
  store::ScheduleStore,
};
use tend_engine::Engine;

use crate::error::ApiError;

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ApiError {
  ApiError::Store(Box::new(e))
}

// ─── Caregivers ──────────────────────────────────────────────────────────────

/// `GET /caregivers`
pub async fn list_caregivers<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
) -> Result<Json<Vec<Caregiver>>, ApiError> {
  Ok(Json(engine.store().list_caregivers().await.map_err(store_err)?))
}

/// `POST /caregivers`
pub async fn create_caregiver<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Json(body): Json<NewCaregiver>,
) -> Result<impl IntoResponse, ApiError> {
  let caregiver =
    engine.store().add_caregiver(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(caregiver)))
}

// ─── Houses ──────────────────────────────────────────────────────────────────

/// `GET /houses`
pub async fn list_houses<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
) -> Result<Json<Vec<House>>, ApiError> {
  Ok(Json(engine.store().list_houses().await.map_err(store_err)?))
}

/// `POST /houses`
pub async fn create_house<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Json(body): Json<NewHouse>,
) -> Result<impl IntoResponse, ApiError> {
  let house = engine.store().add_house(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(house)))
}

// ─── Recipients ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct RecipientParams {
  /// Exclude deactivated residents. Default `false`.
  #[serde(default)]
  pub active_only: bool,
}

/// `GET /recipients[?active_only=true]`
pub async fn list_recipients<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  axum::extract::Query(params): axum::extract::Query<RecipientParams>,
) -> Result<Json<Vec<CareRecipient>>, ApiError> {
  Ok(Json(
    engine
      .store()
      .list_recipients(params.active_only)
      .await
      .map_err(store_err)?,
  ))
}

/// `POST /recipients`
pub async fn create_recipient<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Json(body): Json<NewCareRecipient>,
) -> Result<impl IntoResponse, ApiError> {
  let recipient =
    engine.store().add_recipient(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(recipient)))
}
