//! Core types and trait definitions for the tend scheduling engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod assignment;
pub mod config;
pub mod error;
pub mod roster;
pub mod schedule;
pub mod store;

pub use error::{Error, Result};
