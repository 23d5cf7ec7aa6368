//! Patient record types.
//!
//! A [`PatientRecord`] holds the stored fields only; BMI and the health
//! verdict are derived on demand and never persisted. The record identifier
//! is the key in the surrounding store mapping, not a field of the record.

use crate::{PatientError, PatientResult};
use serde::{Deserialize, Serialize};

/// Patient gender.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Health verdict bucket derived from BMI.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, utoipa::ToSchema)]
pub enum Verdict {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obesity")]
    Obesity,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obesity => "Obesity",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single patient record as persisted in the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    /// Height in meters.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
}

/// Partial update for an existing record. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl PatientRecord {
    /// Create a validated record.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if age is outside 1..=119 or
    /// height/weight are not strictly positive and finite.
    pub fn new(
        name: String,
        city: String,
        age: u32,
        gender: Gender,
        height: f64,
        weight: f64,
    ) -> PatientResult<Self> {
        let record = Self {
            name,
            city,
            age,
            gender,
            height,
            weight,
        };
        record.validate()?;
        Ok(record)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> PatientResult<()> {
        if self.age == 0 || self.age >= 120 {
            return Err(PatientError::InvalidInput(
                "age must be between 1 and 119".into(),
            ));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(PatientError::InvalidInput(
                "height must be a positive number of meters".into(),
            ));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(PatientError::InvalidInput(
                "weight must be a positive number of kilograms".into(),
            ));
        }
        Ok(())
    }

    /// Body Mass Index, rounded to two decimal places.
    pub fn bmi(&self) -> f64 {
        let raw = self.weight / (self.height * self.height);
        (raw * 100.0).round() / 100.0
    }

    /// Health verdict bucket for the record's BMI.
    ///
    /// The bucket edges are intentionally kept as deployed, uncovered gaps
    /// included: BMI in `[24.9, 25)` or `[29.9, 30)` falls through to
    /// `Obesity`. Stored records were bucketed this way, so the edges stay.
    pub fn verdict(&self) -> Verdict {
        let bmi = self.bmi();
        if bmi < 18.5 {
            Verdict::Underweight
        } else if bmi < 24.9 {
            Verdict::NormalWeight
        } else if (25.0..29.9).contains(&bmi) {
            Verdict::Overweight
        } else {
            Verdict::Obesity
        }
    }

    /// Merge a partial update into this record and revalidate the result.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if the merged record fails
    /// validation; `self` is left untouched in that case.
    pub fn merged(&self, update: &PatientUpdate) -> PatientResult<Self> {
        let record = Self {
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            city: update.city.clone().unwrap_or_else(|| self.city.clone()),
            age: update.age.unwrap_or(self.age),
            gender: update.gender.unwrap_or(self.gender),
            height: update.height.unwrap_or(self.height),
            weight: update.weight.unwrap_or(self.weight),
        };
        record.validate()?;
        Ok(record)
    }
}
