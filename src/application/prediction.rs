//! Prediction service: Submits patient records to the backend.

use std::sync::Arc;

use crate::domain::{PatientData, PredictionResult};
use crate::ports::{ApiError, PredictionApi};

/// Service for submitting predictions.
///
/// Log lines deliberately carry no patient identifiers; the sanitizing
/// writer in `adapters::sanitize` is the fallback, not the primary
/// protection.
pub struct PredictionService<A>
where
    A: PredictionApi,
{
    api: Arc<A>,
}

impl<A> PredictionService<A>
where
    A: PredictionApi,
{
    /// Create a new prediction service.
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Submit one patient record and return the backend's assessment.
    ///
    /// Exactly one request per invocation; the caller holds the
    /// re-entrancy guard.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status, or an
    /// undecodable body.
    pub fn submit(&self, patient: &PatientData) -> Result<PredictionResult, ApiError> {
        tracing::debug!("Submitting prediction request...");

        match self.api.submit_prediction(patient) {
            Ok(result) => {
                tracing::info!(
                    "Prediction complete: prediction={}, disease_probability={:.1}%, risk={}",
                    result.prediction,
                    result.probability_disease * 100.0,
                    result.risk_level
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!("Prediction request failed: {}", e);
                Err(e)
            }
        }
    }

    /// Probe backend reachability at startup. Never fatal; the form can
    /// still be used and will surface errors on submission.
    pub fn check_backend(&self) -> bool {
        match self.api.health() {
            Ok(report) => {
                tracing::info!(
                    "Backend reachable: status={}, database={}, stored={}",
                    report.status,
                    report.database,
                    report.total_predictions_stored
                );
                true
            }
            Err(e) => {
                tracing::warn!("Backend health probe failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HealthReport, PredictionStats, RecentPrediction};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubApi {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubApi {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PredictionApi for StubApi {
        fn submit_prediction(&self, patient: &PatientData) -> Result<PredictionResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Status(500));
            }
            Ok(PredictionResult {
                prediction_id: 1,
                patient_name: patient.name.clone(),
                prediction: 1,
                probability_no_disease: 0.3,
                probability_disease: 0.7,
                risk_level: "High Risk".to_string(),
                model_used: "v1".to_string(),
                prediction_date: "2024-01-01".to_string(),
            })
        }

        fn recent_predictions(&self) -> Result<Option<Vec<RecentPrediction>>, ApiError> {
            Ok(None)
        }

        fn stats(&self) -> Result<Option<PredictionStats>, ApiError> {
            Ok(None)
        }

        fn health(&self) -> Result<HealthReport, ApiError> {
            if self.fail {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(HealthReport {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                total_predictions_stored: 0,
            })
        }
    }

    #[test]
    fn test_submit_passes_through_result() {
        let api = Arc::new(StubApi::new(false));
        let service = PredictionService::new(api.clone());

        let patient = PatientData {
            name: "Alice".to_string(),
            ..PatientData::default()
        };
        let result = service.submit(&patient).expect("Should submit");

        assert_eq!(result.patient_name, "Alice");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_propagates_failure() {
        let api = Arc::new(StubApi::new(true));
        let service = PredictionService::new(api);

        let err = service
            .submit(&PatientData::default())
            .expect_err("Should fail");
        assert!(matches!(err, ApiError::Status(500)));
    }

    #[test]
    fn test_health_probe_is_non_fatal() {
        let service = PredictionService::new(Arc::new(StubApi::new(true)));
        assert!(!service.check_backend());

        let service = PredictionService::new(Arc::new(StubApi::new(false)));
        assert!(service.check_backend());
    }
}
