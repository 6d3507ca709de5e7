//! Handler for the `/activity` endpoint.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use tend_core::{activity::ActivityEvent, store::ScheduleStore};
use tend_engine::Engine;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Maximum number of events, newest first. Default 50.
  pub limit: Option<usize>,
}

/// `GET /activity[?limit=N]`
pub async fn list<S: ScheduleStore>(
  State(engine): State<Engine<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActivityEvent>>, ApiError> {
  let events = engine
    .store()
    .list_events(params.limit.unwrap_or(50))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}
