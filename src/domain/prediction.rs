//! Prediction result and statistics types.
//!
//! Wire types mirror the prediction API responses. The backend owns risk
//! classification; the client only parses the labels it returns.

use serde::{Deserialize, Serialize};

/// Risk level classification attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk of heart disease
    Low,
    /// Medium risk, follow-up recommended
    Medium,
    /// High risk, intervention recommended
    High,
}

impl RiskLevel {
    /// Parse a backend risk label ("High Risk", "Medium Risk", "Low Risk").
    ///
    /// Returns `None` for unrecognized labels; callers render those with the
    /// default text style instead of guessing a bucket.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "High Risk" => Some(Self::High),
            "Medium Risk" => Some(Self::Medium),
            "Low Risk" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low Risk"),
            Self::Medium => write!(f, "Medium Risk"),
            Self::High => write!(f, "High Risk"),
        }
    }
}

/// Binary prediction outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No heart disease predicted
    NoDisease,
    /// Heart disease predicted
    Disease,
}

impl Outcome {
    /// Map the backend's 0/1 prediction field.
    #[must_use]
    pub fn from_prediction(prediction: u8) -> Self {
        if prediction == 1 {
            Self::Disease
        } else {
            Self::NoDisease
        }
    }

    /// Parse the pre-formatted label used by the recent-predictions feed.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Disease" => Some(Self::Disease),
            "No Disease" => Some(Self::NoDisease),
            _ => None,
        }
    }

    /// Result-panel label for this outcome.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disease => "Has Heart Disease",
            Self::NoDisease => "No Heart Disease",
        }
    }
}

/// Immutable server response to one prediction submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Database identifier assigned by the backend
    pub prediction_id: i64,

    /// Name echoed from the submitted record
    pub patient_name: String,

    /// Binary prediction (0 = no disease, 1 = disease)
    pub prediction: u8,

    /// Probability of no disease (0.0 to 1.0)
    pub probability_no_disease: f64,

    /// Probability of disease (0.0 to 1.0, complementary)
    pub probability_disease: f64,

    /// Backend risk label ("High Risk" / "Medium Risk" / "Low Risk")
    pub risk_level: String,

    /// Identifier of the model that produced the result
    pub model_used: String,

    /// Backend-formatted timestamp, rendered verbatim
    pub prediction_date: String,
}

impl PredictionResult {
    /// Outcome of the binary prediction field.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::from_prediction(self.prediction)
    }

    /// Parsed risk level, `None` for unknown labels.
    #[must_use]
    pub fn risk(&self) -> Option<RiskLevel> {
        RiskLevel::from_label(&self.risk_level)
    }
}

/// Historical prediction record from the recent-predictions feed.
///
/// The backend pre-formats `sex` and `prediction` as display strings and
/// only returns the columns it stores; the remaining clinical fields of the
/// submitted record are optional in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPrediction {
    pub id: i64,
    pub patient_name: String,
    pub age: u32,
    /// Pre-formatted "Male" / "Female"
    pub sex: String,
    /// Pre-formatted "Disease" / "No Disease"
    pub prediction: String,
    /// Probability of disease (0.0 to 1.0)
    pub disease_probability: f64,
    pub risk_level: String,
    #[serde(default)]
    pub prediction_date: String,

    // Remaining clinical fields of the submitted record; the current
    // backend omits them from this feed.
    #[serde(default)]
    pub cp: Option<String>,
    #[serde(default)]
    pub trestbps: Option<u32>,
    #[serde(default)]
    pub chol: Option<u32>,
    #[serde(default)]
    pub fbs: Option<String>,
    #[serde(default)]
    pub restecg: Option<String>,
    #[serde(default)]
    pub thalach: Option<u32>,
    #[serde(default)]
    pub exang: Option<String>,
    #[serde(default)]
    pub oldpeak: Option<f64>,
    #[serde(default)]
    pub slope: Option<String>,
    #[serde(default)]
    pub ca: Option<u32>,
    #[serde(default)]
    pub thal: Option<String>,
}

impl RecentPrediction {
    /// Parsed outcome, `None` for unknown labels.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        Outcome::from_label(&self.prediction)
    }

    /// Parsed risk level, `None` for unknown labels.
    #[must_use]
    pub fn risk(&self) -> Option<RiskLevel> {
        RiskLevel::from_label(&self.risk_level)
    }
}

/// Risk distribution buckets as returned by the stats endpoint.
///
/// The buckets are assumed to sum to the total prediction count; the client
/// does not validate this.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high_risk: u64,
    pub medium_risk: u64,
    pub low_risk: u64,
}

/// Backend-precomputed summary over the full prediction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionStats {
    pub total_predictions: u64,

    /// Count of disease-positive predictions
    pub disease_predictions: u64,

    /// Count of disease-negative predictions
    pub no_disease_predictions: u64,

    /// Already expressed on a 0-100 scale, never multiplied by 100 again
    pub disease_rate: f64,

    pub risk_distribution: RiskDistribution,
}

impl PredictionStats {
    /// Proportional bar width (0-100) for one risk bucket.
    ///
    /// Returns 0 when the total is 0, so an empty history never divides by
    /// zero. Clamped at 100 in case the backend's buckets exceed the total.
    #[must_use]
    pub fn bar_width(&self, bucket: u64) -> f64 {
        if self.total_predictions == 0 {
            return 0.0;
        }
        (bucket as f64 / self.total_predictions as f64 * 100.0).min(100.0)
    }
}

/// Backend health probe response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub total_predictions_stored: u64,
}

/// Round a 0-1 probability to a whole percentage.
#[must_use]
pub fn percent_whole(probability: f64) -> u32 {
    (probability * 100.0).round() as u32
}
