use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Gender;

/// Vital signs at the time of the record. All measurements are optional;
/// missing values are imputed for clustering and skipped for risk scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// mmHg
    pub systolic_bp: Option<f64>,
    /// mmHg
    pub diastolic_bp: Option<f64>,
    /// bpm
    pub heart_rate: Option<f64>,
    /// Recorded BMI. When absent it is derived from weight and height.
    pub bmi: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl VitalSigns {
    /// Recorded BMI, or weight / height² rounded to one decimal.
    pub fn bmi(&self) -> Option<f64> {
        if self.bmi.is_some() {
            return self.bmi;
        }
        match (self.weight_kg, self.height_cm) {
            (Some(weight), Some(height)) if height > 0.0 => {
                let height_m = height / 100.0;
                Some((weight / (height_m * height_m) * 10.0).round() / 10.0)
            }
            _ => None,
        }
    }
}

/// Laboratory panel. Units: mg/dL except HbA1c (%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabResults {
    pub fasting_glucose: Option<f64>,
    pub hba1c: Option<f64>,
    pub total_cholesterol: Option<f64>,
    pub ldl_cholesterol: Option<f64>,
    pub hdl_cholesterol: Option<f64>,
    pub triglycerides: Option<f64>,
    pub creatinine: Option<f64>,
    pub bun: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    /// Ordered set: insertion order kept, duplicates dropped.
    pub conditions: Vec<String>,
    pub medications: BTreeSet<String>,
    pub allergies: Vec<String>,
    pub family_diabetes: bool,
    pub family_heart_disease: bool,
}

impl MedicalHistory {
    pub fn new<C, M>(conditions: C, medications: M) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for condition in conditions {
            let condition = condition.into();
            if !ordered.contains(&condition) {
                ordered.push(condition);
            }
        }

        Self {
            conditions: ordered,
            medications: medications.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Derive the family-history flags from free-text entries such as
    /// "Type 2 Diabetes (mother)" or "Heart attack (father at 55)".
    pub fn with_family_history<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for entry in entries {
            let lower = entry.as_ref().to_lowercase();
            if lower.contains("diabetes") {
                self.family_diabetes = true;
            }
            if lower.contains("heart") {
                self.family_heart_disease = true;
            }
        }
        self
    }

    pub fn with_allergies<I, S>(mut self, allergies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allergies = allergies.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive substring match over condition names.
    pub fn has_condition(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.conditions
            .iter()
            .any(|c| c.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match over current medications.
    pub fn takes_medication(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.medications
            .iter()
            .any(|m| m.to_lowercase().contains(&needle))
    }
}

/// A patient health record as handed to the analysis core.
///
/// Treated as immutable during analysis; updates replace the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Gender,
    pub vitals: VitalSigns,
    pub labs: LabResults,
    pub history: MedicalHistory,
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PatientRecord {
    pub fn new(
        patient_id: impl Into<String>,
        name: impl Into<String>,
        age: Option<u32>,
        gender: Gender,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: name.into(),
            age,
            gender,
            vitals: VitalSigns::default(),
            labs: LabResults::default(),
            history: MedicalHistory::default(),
            symptoms: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_identifier(&self) -> bool {
        !self.patient_id.trim().is_empty()
    }
}
