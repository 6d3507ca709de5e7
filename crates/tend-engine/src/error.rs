//! Error type for `tend-engine`.
//!
//! Coverage failures (an emergency with no donor, an unrepairable
//! zero-coverage day) are *not* errors — they are surfaced as explicit report
//! fields so callers can decide remediation. Errors here are input-validation
//! and referential failures, rejected before any write, plus store failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] tend_core::Error),

  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
