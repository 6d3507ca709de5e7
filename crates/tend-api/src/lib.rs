//! JSON REST API for tend.
//!
//! Exposes an axum [`Router`] backed by an [`Engine`] over any
//! [`tend_core::store::ScheduleStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tend_api::api_router(engine.clone()))
//! ```

pub mod activity;
pub mod caregivers;
pub mod emergency;
pub mod error;
pub mod roster;
pub mod schedule;

use axum::{
  Router,
  routing::{get, post},
};
use tend_core::store::ScheduleStore;
use tend_engine::Engine;

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Engine<S>) -> Router<()>
where
  S: ScheduleStore + 'static,
{
  Router::new()
    // Schedule lifecycle
    .route("/schedule/generate", post(schedule::generate::<S>))
    .route("/schedule/clear", post(schedule::clear::<S>))
    .route("/schedule/current", get(schedule::current::<S>))
    // Absences
    .route("/assignments/{id}/absence", post(schedule::mark_absence::<S>))
    // Emergency coverage
    .route("/emergency/{date}", get(emergency::check::<S>))
    .route("/emergency/{date}/activate", post(emergency::activate::<S>))
    // Caregiver integration
    .route("/caregivers/unassigned", get(caregivers::unassigned::<S>))
    .route("/caregivers/{id}/placements", get(caregivers::placements::<S>))
    .route("/caregivers/{id}/integrate", post(caregivers::integrate::<S>))
    // Rosters
    .route(
      "/caregivers",
      get(roster::list_caregivers::<S>).post(roster::create_caregiver::<S>),
    )
    .route(
      "/houses",
      get(roster::list_houses::<S>).post(roster::create_house::<S>),
    )
    .route(
      "/recipients",
      get(roster::list_recipients::<S>).post(roster::create_recipient::<S>),
    )
    // Activity log
    .route("/activity", get(activity::list::<S>))
    .with_state(engine)
}

/// The operator recorded in the activity log when a request names none.
pub(crate) fn operator_or_default(operator: Option<String>) -> String {
  operator.unwrap_or_else(|| "api".to_owned())
}
