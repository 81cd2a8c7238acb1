//! Background workers for non-blocking API calls.
//!
//! Each request runs on its own short-lived thread and reports back over a
//! channel polled by the TUI main loop, keeping the UI responsive during
//! network round trips. Dropping a handle drops the receiver; a late
//! response then has nowhere to land and is discarded, which is how stale
//! results are kept away from a view that moved on.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::{DashboardService, DashboardSnapshot, PredictionService};
use crate::domain::{PatientData, PredictionResult};
use crate::ports::{ApiError, PredictionApi};

/// Response from a background API call.
pub enum ApiResponse {
    /// Outcome of a prediction submission
    Prediction(Result<Box<PredictionResult>, ApiError>),
    /// Outcome of a dashboard load (both fetches)
    Dashboard(DashboardSnapshot),
}

/// Handle to a running API worker.
pub struct ApiWorkerHandle {
    response_rx: Receiver<ApiResponse>,
    _handle: JoinHandle<()>,
}

impl ApiWorkerHandle {
    /// Try to receive the response (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<ApiResponse> {
        self.response_rx.try_recv().ok()
    }
}

/// Spawns background API requests.
pub struct ApiWorker;

impl ApiWorker {
    /// Submit a patient record on a background thread.
    pub fn submit<A>(
        service: Arc<PredictionService<A>>,
        patient: PatientData,
    ) -> ApiWorkerHandle
    where
        A: PredictionApi + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = service.submit(&patient).map(Box::new);
            // Send fails when the view dropped the handle; the response is
            // discarded with the channel.
            let _ = tx.send(ApiResponse::Prediction(result));
        });

        ApiWorkerHandle {
            response_rx: rx,
            _handle: handle,
        }
    }

    /// Load the dashboard aggregates on a background thread.
    pub fn load_dashboard<A>(service: Arc<DashboardService<A>>) -> ApiWorkerHandle
    where
        A: PredictionApi + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let snapshot = service.load();
            let _ = tx.send(ApiResponse::Dashboard(snapshot));
        });

        ApiWorkerHandle {
            response_rx: rx,
            _handle: handle,
        }
    }
}
