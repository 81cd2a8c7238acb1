//! Dashboard service: Aggregated history for the dashboard view.

use std::sync::Arc;

use crate::domain::{PredictionStats, RecentPrediction};
use crate::ports::PredictionApi;

/// Result of one dashboard load.
///
/// Each slice is `Some` only when its fetch succeeded and the expected
/// field was present; the view leaves the other slice untouched. `failed`
/// is set on any transport-level failure, independent of what else was
/// applied (graceful degradation over strict atomicity).
#[derive(Debug, Default)]
pub struct DashboardSnapshot {
    pub recent: Option<Vec<RecentPrediction>>,
    pub stats: Option<PredictionStats>,
    pub failed: bool,
}

/// Service for loading dashboard aggregates.
pub struct DashboardService<A>
where
    A: PredictionApi,
{
    api: Arc<A>,
}

impl<A> DashboardService<A>
where
    A: PredictionApi,
{
    /// Create a new dashboard service.
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Fetch recent predictions and aggregate statistics.
    ///
    /// The two fetches are independent: a failure in one does not prevent
    /// the other slice from applying, and a success whose payload lacks
    /// the expected field is skipped silently.
    pub fn load(&self) -> DashboardSnapshot {
        let mut snapshot = DashboardSnapshot::default();

        match self.api.recent_predictions() {
            Ok(Some(records)) => {
                tracing::debug!("Loaded {} recent predictions", records.len());
                snapshot.recent = Some(records);
            }
            Ok(None) => {
                tracing::debug!("Recent-predictions payload has no predictions field, skipping");
            }
            Err(e) => {
                tracing::warn!("Failed to load recent predictions: {}", e);
                snapshot.failed = true;
            }
        }

        match self.api.stats() {
            Ok(Some(stats)) => {
                tracing::debug!(
                    "Loaded stats: total={}, disease_rate={}%",
                    stats.total_predictions,
                    stats.disease_rate
                );
                snapshot.stats = Some(stats);
            }
            Ok(None) => {
                tracing::debug!("Stats payload has no total_predictions field, skipping");
            }
            Err(e) => {
                tracing::warn!("Failed to load stats: {}", e);
                snapshot.failed = true;
            }
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HealthReport, PatientData, PredictionResult, RiskDistribution};
    use crate::ports::ApiError;

    struct StubApi {
        recent: Result<Option<Vec<RecentPrediction>>, ApiError>,
        stats: Result<Option<PredictionStats>, ApiError>,
    }

    impl PredictionApi for StubApi {
        fn submit_prediction(&self, _patient: &PatientData) -> Result<PredictionResult, ApiError> {
            Err(ApiError::Status(404))
        }

        fn recent_predictions(&self) -> Result<Option<Vec<RecentPrediction>>, ApiError> {
            clone_result(&self.recent)
        }

        fn stats(&self) -> Result<Option<PredictionStats>, ApiError> {
            clone_result(&self.stats)
        }

        fn health(&self) -> Result<HealthReport, ApiError> {
            Err(ApiError::Status(404))
        }
    }

    fn clone_result<T: Clone>(r: &Result<Option<T>, ApiError>) -> Result<Option<T>, ApiError> {
        match r {
            Ok(v) => Ok(v.clone()),
            Err(ApiError::Transport(msg)) => Err(ApiError::Transport(msg.clone())),
            Err(ApiError::Status(code)) => Err(ApiError::Status(*code)),
            Err(ApiError::Decode(_)) => Err(ApiError::Transport("decode".to_string())),
        }
    }

    fn record(id: i64) -> RecentPrediction {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "patient_name": "Alice",
            "age": 55,
            "sex": "Female",
            "prediction": "Disease",
            "disease_probability": 0.7,
            "risk_level": "High Risk",
            "prediction_date": "2024-01-01 10:30:00"
        }))
        .expect("Should build record")
    }

    fn stats(total: u64) -> PredictionStats {
        PredictionStats {
            total_predictions: total,
            disease_predictions: 1,
            no_disease_predictions: total - 1,
            disease_rate: 50.0,
            risk_distribution: RiskDistribution::default(),
        }
    }

    #[test]
    fn test_both_slices_apply() {
        let service = DashboardService::new(Arc::new(StubApi {
            recent: Ok(Some(vec![record(1), record(2)])),
            stats: Ok(Some(stats(2))),
        }));

        let snapshot = service.load();
        assert_eq!(snapshot.recent.as_ref().map(Vec::len), Some(2));
        assert!(snapshot.stats.is_some());
        assert!(!snapshot.failed);
    }

    #[test]
    fn test_stats_failure_does_not_block_recent() {
        let service = DashboardService::new(Arc::new(StubApi {
            recent: Ok(Some(vec![record(1)])),
            stats: Err(ApiError::Transport("connection refused".to_string())),
        }));

        let snapshot = service.load();
        assert_eq!(snapshot.recent.as_ref().map(Vec::len), Some(1));
        assert!(snapshot.stats.is_none());
        assert!(snapshot.failed);
    }

    #[test]
    fn test_recent_failure_does_not_block_stats() {
        let service = DashboardService::new(Arc::new(StubApi {
            recent: Err(ApiError::Status(502)),
            stats: Ok(Some(stats(5))),
        }));

        let snapshot = service.load();
        assert!(snapshot.recent.is_none());
        assert!(snapshot.stats.is_some());
        assert!(snapshot.failed);
    }

    #[test]
    fn test_absent_fields_are_skipped_without_error() {
        let service = DashboardService::new(Arc::new(StubApi {
            recent: Ok(None),
            stats: Ok(None),
        }));

        let snapshot = service.load();
        assert!(snapshot.recent.is_none());
        assert!(snapshot.stats.is_none());
        assert!(!snapshot.failed);
    }
}
