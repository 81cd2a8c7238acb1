//! # Cardioscope
//!
//! Terminal client for a heart disease prediction service.
//!
//! This crate provides:
//! - A patient data entry form that submits to the prediction API
//! - A dashboard aggregating recent predictions and summary statistics
//! - Terminal UI for clinical workstation deployment
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient record, prediction, statistics)
//! - `ports`: Trait definition for the prediction backend
//! - `adapters`: Concrete implementations (HTTP gateway, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Outcome, PatientData, PredictionResult, PredictionStats, RiskLevel};
pub use ports::{ApiError, PredictionApi};
