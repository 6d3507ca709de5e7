//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<tend_engine::Error> for ApiError {
  fn from(e: tend_engine::Error) -> Self {
    use tend_core::Error as Core;
    match e {
      tend_engine::Error::Core(c) => match &c {
        Core::CaregiverNotFound(_)
        | Core::HouseNotFound(_)
        | Core::RecipientNotFound(_)
        | Core::AssignmentNotFound(_)
        | Core::NoCurrentVersion => ApiError::NotFound(c.to_string()),
        Core::InvalidDuration(_)
        | Core::StaleAssignment(_)
        | Core::AlreadyAssigned(_)
        | Core::DateOutOfWindow { .. }
        | Core::EmptyRoster(_) => ApiError::BadRequest(c.to_string()),
        Core::Serialization(_) => ApiError::Store(Box::new(c)),
      },
      tend_engine::Error::Store(inner) => ApiError::Store(inner),
    }
  }
}
