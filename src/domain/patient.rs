//! Patient data types for heart disease prediction.
//!
//! Field set matches the Cleveland heart disease dataset as exposed by the
//! prediction API.

use serde::{Deserialize, Serialize};

/// One in-progress, user-editable patient record.
///
/// Created with defaults when the form opens, mutated field by field on
/// user input, and read once as a snapshot at submission time. Categorical
/// fields are encoded as the small integers the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientData {
    /// Patient name (free text, required for submission)
    pub name: String,

    /// Age in years (20-80)
    pub age: u32,

    /// Sex: 0 = female, 1 = male
    pub sex: u8,

    /// Chest pain type (0-3: typical angina, atypical angina,
    /// non-anginal pain, asymptomatic)
    pub cp: u8,

    /// Resting blood pressure in mm Hg (90-200)
    pub trestbps: u32,

    /// Serum cholesterol in mg/dl (100-400)
    pub chol: u32,

    /// Fasting blood sugar > 120 mg/dl: 0 or 1
    pub fbs: u8,

    /// Resting ECG (0-2: normal, ST-T abnormality, LV hypertrophy)
    pub restecg: u8,

    /// Maximum heart rate achieved (60-220)
    pub thalach: u32,

    /// Exercise induced angina: 0 or 1
    pub exang: u8,

    /// ST depression induced by exercise relative to rest (0.0-10.0)
    pub oldpeak: f64,

    /// Slope of the peak exercise ST segment (0-2)
    pub slope: u8,

    /// Number of major vessels colored by fluoroscopy (0-3)
    pub ca: u8,

    /// Thalassemia (1 = normal, 2 = fixed defect, 3 = reversible defect)
    pub thal: u8,
}

impl Default for PatientData {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 50,
            sex: 1,
            cp: 0,
            trestbps: 120,
            chol: 200,
            fbs: 0,
            restecg: 0,
            thalach: 150,
            exang: 0,
            oldpeak: 0.0,
            slope: 1,
            ca: 0,
            thal: 1,
        }
    }
}

impl PatientData {
    /// Whether the record can be submitted.
    ///
    /// Submission is gated on a non-empty, non-whitespace name. No other
    /// field needs validation: the editing controls keep every field inside
    /// its valid range.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
