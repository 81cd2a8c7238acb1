//! Prediction API port: Trait for the backend gateway.
//!
//! This trait abstracts the HTTP backend from the application logic so the
//! services and the TUI can be exercised against stub backends in tests.

use crate::domain::{HealthReport, PatientData, PredictionResult, PredictionStats, RecentPrediction};

/// Failure of one backend round trip.
///
/// Raw detail stays in the log; the views render their own fixed messages.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Endpoint unreachable or the connection failed mid-request
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status, regardless of body content
    #[error("server returned status {0}")]
    Status(u16),

    /// Response body did not match the expected shape
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Gateway to the prediction backend.
///
/// The two dashboard calls return `Ok(None)` when the response was a
/// success but the expected field is absent; callers skip that slice of
/// state without raising an error.
pub trait PredictionApi: Send + Sync {
    /// Submit one patient record for prediction.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or an
    /// undecodable body.
    fn submit_prediction(&self, patient: &PatientData) -> Result<PredictionResult, ApiError>;

    /// Fetch the recent-predictions feed.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or an
    /// undecodable body.
    fn recent_predictions(&self) -> Result<Option<Vec<RecentPrediction>>, ApiError>;

    /// Fetch the precomputed aggregate statistics.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or an
    /// undecodable body.
    fn stats(&self) -> Result<Option<PredictionStats>, ApiError>;

    /// Probe backend reachability.
    ///
    /// # Errors
    /// Returns error if the backend cannot be reached.
    fn health(&self) -> Result<HealthReport, ApiError>;
}
