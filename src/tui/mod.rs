//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Patient data entry and prediction submission
//! - Prediction result display
//! - Dashboard with aggregate statistics and history

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::MedicalTheme;
pub use worker::{ApiResponse, ApiWorker, ApiWorkerHandle};
