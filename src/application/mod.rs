//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with the backend port to
//! implement the two client workflows: prediction submission and
//! dashboard aggregation.

mod dashboard;
mod prediction;

pub use dashboard::{DashboardService, DashboardSnapshot};
pub use prediction::PredictionService;
