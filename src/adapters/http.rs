//! HTTP gateway to the prediction API.
//!
//! A thin blocking client. Callers run it on worker threads so the TUI
//! event loop never blocks on the network (see `tui::worker`).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{
    HealthReport, PatientData, PredictionResult, PredictionStats, RecentPrediction,
    RiskDistribution,
};
use crate::ports::{ApiError, PredictionApi};

/// Default base endpoint when `CARDIOSCOPE_API_URL` is unset.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocking HTTP client for the prediction backend.
pub struct HttpApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client against the given base endpoint.
    ///
    /// # Errors
    /// Returns error if the underlying client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let timeout = std::env::var("CARDIOSCOPE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    /// Create a client from `CARDIOSCOPE_API_URL`.
    ///
    /// # Errors
    /// Returns error if the underlying client cannot be constructed.
    pub fn from_env() -> Result<Self, ApiError> {
        let base = std::env::var("CARDIOSCOPE_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base)
    }

    /// The configured base endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::decode(response)
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::decode(response)
    }

    fn decode<T: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Envelope of `GET /recent-predictions`.
///
/// The backend returns `{"message": ...}` instead of a `predictions` field
/// when the history is empty; an absent field is not an error.
#[derive(Debug, Deserialize)]
struct RecentPayload {
    #[serde(default)]
    predictions: Option<Vec<RecentPrediction>>,
}

/// Envelope of `GET /stats`.
///
/// All fields are optional at the wire level; the payload only counts as
/// statistics when `total_predictions` is defined.
#[derive(Debug, Deserialize)]
struct StatsPayload {
    #[serde(default)]
    total_predictions: Option<u64>,
    #[serde(default)]
    disease_predictions: u64,
    #[serde(default)]
    no_disease_predictions: u64,
    #[serde(default)]
    disease_rate: f64,
    #[serde(default)]
    risk_distribution: RiskDistribution,
}

impl StatsPayload {
    fn into_stats(self) -> Option<PredictionStats> {
        Some(PredictionStats {
            total_predictions: self.total_predictions?,
            disease_predictions: self.disease_predictions,
            no_disease_predictions: self.no_disease_predictions,
            disease_rate: self.disease_rate,
            risk_distribution: self.risk_distribution,
        })
    }
}

impl PredictionApi for HttpApiClient {
    fn submit_prediction(&self, patient: &PatientData) -> Result<PredictionResult, ApiError> {
        self.post_json("/predict", patient)
    }

    fn recent_predictions(&self) -> Result<Option<Vec<RecentPrediction>>, ApiError> {
        let payload: RecentPayload = self.get_json("/recent-predictions")?;
        Ok(payload.predictions)
    }

    fn stats(&self) -> Result<Option<PredictionStats>, ApiError> {
        let payload: StatsPayload = self.get_json("/stats")?;
        Ok(payload.into_stats())
    }

    fn health(&self) -> Result<HealthReport, ApiError> {
        self.get_json("/health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve exactly one canned HTTP response on a loopback socket.
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Should bind loopback");
        let addr = listener.local_addr().expect("Should have local addr");
        let status_line = status_line.to_string();
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("Should accept");

            // Drain the request (head plus any Content-Length body) before
            // responding, so the client never sees an early close.
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let header_end = loop {
                let n = stream.read(&mut buf).expect("Should read request");
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    return;
                }
            };

            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head.lines().find_map(|line| {
                let lower = line.to_ascii_lowercase();
                lower.strip_prefix("content-length:")?.trim().parse::<usize>().ok()
            });
            if let Some(len) = content_length {
                let mut have = request.len() - header_end;
                while have < len {
                    let n = stream.read(&mut buf).expect("Should read body");
                    if n == 0 {
                        break;
                    }
                    have += n;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("Should write response");
        });

        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_submit_decodes_result() {
        let body = r#"{
            "prediction_id": 1,
            "patient_name": "Alice",
            "prediction": 1,
            "probability_no_disease": 0.3,
            "probability_disease": 0.7,
            "risk_level": "High Risk",
            "model_used": "v1",
            "prediction_date": "2024-01-01"
        }"#;
        let (base, server) = serve_once("200 OK", body);

        let client = HttpApiClient::new(base).expect("Should build client");
        let result = client
            .submit_prediction(&PatientData {
                name: "Alice".to_string(),
                age: 55,
                ..PatientData::default()
            })
            .expect("Should submit");

        assert_eq!(result.prediction_id, 1);
        assert_eq!(result.patient_name, "Alice");
        assert_eq!(result.prediction, 1);
        assert!((result.probability_disease - 0.7).abs() < f64::EPSILON);
        server.join().expect("Server thread");
    }

    #[test]
    fn test_non_success_status_is_failure() {
        let (base, server) = serve_once("500 Internal Server Error", r#"{"detail": "boom"}"#);

        let client = HttpApiClient::new(base).expect("Should build client");
        let err = client
            .submit_prediction(&PatientData::default())
            .expect_err("Should fail");

        assert!(matches!(err, ApiError::Status(500)));
        server.join().expect("Server thread");
    }

    #[test]
    fn test_malformed_body_is_decode_failure() {
        let (base, server) = serve_once("200 OK", "not json at all");

        let client = HttpApiClient::new(base).expect("Should build client");
        let err = client.stats().expect_err("Should fail");

        assert!(matches!(err, ApiError::Decode(_)));
        server.join().expect("Server thread");
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").expect("Should bind");
        let addr = listener.local_addr().expect("Should have addr");
        drop(listener);

        let client = HttpApiClient::new(format!("http://{addr}")).expect("Should build client");
        let err = client.recent_predictions().expect_err("Should fail");

        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn test_recent_predictions_field_present() {
        let body = r#"{
            "total_predictions": 1,
            "predictions": [{
                "id": 7,
                "patient_name": "Bob",
                "age": 61,
                "sex": "Male",
                "prediction": "No Disease",
                "disease_probability": 0.12,
                "risk_level": "Low Risk",
                "prediction_date": "2024-01-02 09:00:00"
            }]
        }"#;
        let (base, server) = serve_once("200 OK", body);

        let client = HttpApiClient::new(base).expect("Should build client");
        let records = client
            .recent_predictions()
            .expect("Should fetch")
            .expect("Field should be present");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].sex, "Male");
        server.join().expect("Server thread");
    }

    #[test]
    fn test_recent_predictions_field_absent_is_skipped() {
        let (base, server) = serve_once("200 OK", r#"{"message": "No predictions found"}"#);

        let client = HttpApiClient::new(base).expect("Should build client");
        let records = client.recent_predictions().expect("Should fetch");

        assert!(records.is_none());
        server.join().expect("Server thread");
    }

    #[test]
    fn test_stats_decodes() {
        let body = r#"{
            "total_predictions": 100,
            "disease_predictions": 40,
            "no_disease_predictions": 60,
            "disease_rate": 40.0,
            "risk_distribution": {"high_risk": 25, "medium_risk": 35, "low_risk": 40}
        }"#;
        let (base, server) = serve_once("200 OK", body);

        let client = HttpApiClient::new(base).expect("Should build client");
        let stats = client
            .stats()
            .expect("Should fetch")
            .expect("Field should be present");

        assert_eq!(stats.total_predictions, 100);
        assert_eq!(stats.risk_distribution.high_risk, 25);
        assert!((stats.disease_rate - 40.0).abs() < f64::EPSILON);
        server.join().expect("Server thread");
    }

    #[test]
    fn test_stats_without_total_is_skipped() {
        let (base, server) = serve_once("200 OK", r#"{"message": "No predictions available"}"#);

        let client = HttpApiClient::new(base).expect("Should build client");
        let stats = client.stats().expect("Should fetch");

        assert!(stats.is_none());
        server.join().expect("Server thread");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpApiClient::new("http://localhost:8000/").expect("Should build client");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
