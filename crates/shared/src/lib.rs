//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers (currency codes, fixed-point storage units)
//! - Typed IDs for type-safe entity references
//! - Pagination types for list operations
//! - Application-wide error types
//! - Configuration management
//! - Tracing subscriber setup (`telemetry` feature)

pub mod config;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
