//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the application and the prediction backend.

mod api;

pub use api::{ApiError, PredictionApi};
