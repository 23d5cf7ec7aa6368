//! Request and response types for the REST surface.
//!
//! These are wire types only; validation happens when they are converted
//! into `pms-core` domain types.

use pms_core::{Gender, PatientRecord, PatientResult, PatientUpdate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub service: String,
}

/// Welcome payload served at the API root.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeRes {
    pub message: String,
    pub version: String,
    pub docs: String,
    pub health: String,
}

/// Generic confirmation envelope.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// A patient record as returned by the API, including the derived fields.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub verdict: String,
}

impl PatientRes {
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            city: record.city.clone(),
            age: record.age,
            gender: record.gender,
            height: record.height,
            weight: record.weight,
            bmi: record.bmi(),
            verdict: record.verdict().to_string(),
        }
    }
}

/// Confirmation envelope carrying the affected patient.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientEnvelope {
    pub message: String,
    pub patient: PatientRes,
}

/// Request body for creating a patient.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    /// Caller-assigned unique identifier, e.g. "P001".
    pub id: String,
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
}

impl CreatePatientReq {
    /// Split into the identifier and a validated record.
    ///
    /// # Errors
    ///
    /// Returns the core validation error for out-of-range fields.
    pub fn into_parts(self) -> PatientResult<(String, PatientRecord)> {
        let record = PatientRecord::new(
            self.name,
            self.city,
            self.age,
            self.gender,
            self.height,
            self.weight,
        )?;
        Ok((self.id, record))
    }
}

/// Request body for partially updating a patient. Absent fields are kept.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl UpdatePatientReq {
    pub fn into_update(self) -> PatientUpdate {
        PatientUpdate {
            name: self.name,
            city: self.city,
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
        }
    }
}

fn default_order() -> String {
    "asc".to_string()
}

/// Query parameters for the sort endpoint.
#[derive(Clone, Debug, Deserialize, IntoParams)]
pub struct SortQuery {
    /// Field to sort by: "height", "weight" or "bmi".
    pub sort_by: String,
    /// Sort order: "asc" (default) or "desc".
    #[serde(default = "default_order")]
    pub order: String,
}

/// Request body for a spam prediction.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictReq {
    pub text: String,
}

/// Spam prediction result.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictRes {
    /// "spam" or "not spam".
    pub prediction: String,
    /// Confidence in `[0.5, 1.0]`; 0.5 means the model is untrained.
    pub confidence: f64,
}

/// Training confirmation.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TrainRes {
    pub message: String,
    pub total_emails: usize,
}

/// A new labelled email for online learning.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NewInputReq {
    pub text: String,
    /// 1 = spam, 0 = not spam.
    pub label: i32,
}

/// Accuracy over a freshly generated evaluation batch.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EvaluateRes {
    pub accuracy: f64,
}
