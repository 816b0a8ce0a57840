use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::{Gender, PatientRecord};

use super::types::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Leading features that come from optional measurements and get imputed.
const IMPUTED_FEATURES: usize = 11;

/// Training-population medians for the imputed features, frozen at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMedians {
    values: [f64; IMPUTED_FEATURES],
}

impl FeatureMedians {
    /// Median of each measurement over the records that have it.
    ///
    /// Fails when a measurement is missing from every record: there is
    /// nothing to impute it with.
    pub fn fit(records: &[PatientRecord]) -> Result<Self, AnalysisError> {
        let mut values = [0.0; IMPUTED_FEATURES];

        for (idx, slot) in values.iter_mut().enumerate() {
            let mut present: Vec<f64> = records
                .iter()
                .filter_map(|r| raw_measurements(r)[idx])
                .filter(|v| v.is_finite())
                .collect();

            *slot = median(&mut present).ok_or_else(|| {
                AnalysisError::InsufficientData(format!(
                    "no training record has a value for {}",
                    FEATURE_NAMES[idx]
                ))
            })?;
        }

        Ok(Self { values })
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        FEATURE_NAMES[..IMPUTED_FEATURES]
            .iter()
            .position(|name| *name == feature)
            .map(|idx| self.values[idx])
    }
}

/// Converts a patient record into a `FeatureVector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureExtractor {
    medians: FeatureMedians,
}

impl FeatureExtractor {
    pub fn new(medians: FeatureMedians) -> Self {
        Self { medians }
    }

    /// Capture imputation medians from the training population.
    pub fn fit(records: &[PatientRecord]) -> Result<Self, AnalysisError> {
        Ok(Self::new(FeatureMedians::fit(records)?))
    }

    pub fn medians(&self) -> &FeatureMedians {
        &self.medians
    }

    /// Encode one record. Missing measurements take the training median;
    /// present but non-finite ones are rejected with the field named.
    pub fn extract(&self, record: &PatientRecord) -> Result<FeatureVector, AnalysisError> {
        if !record.has_identifier() {
            return Err(AnalysisError::invalid_record("patient_id", "is missing"));
        }

        let mut vector = [0.0; FEATURE_COUNT];

        for (idx, raw) in raw_measurements(record).into_iter().enumerate() {
            vector[idx] = match raw {
                Some(v) if v.is_finite() => v,
                Some(_) => {
                    return Err(AnalysisError::invalid_record(
                        FEATURE_NAMES[idx],
                        "is not a finite number",
                    ))
                }
                None => self.medians.values[idx],
            };
        }

        vector[11] = record.history.conditions.len() as f64;
        vector[12] = record.history.medications.len() as f64;
        vector[13] = indicator(record.history.family_diabetes);
        vector[14] = indicator(record.history.family_heart_disease);
        vector[15] = indicator(record.gender == Gender::Male);
        vector[16] = indicator(record.gender == Gender::Female);
        vector[17] = indicator(record.gender == Gender::Other);

        Ok(vector)
    }
}

/// Optional measurements in feature order.
fn raw_measurements(record: &PatientRecord) -> [Option<f64>; IMPUTED_FEATURES] {
    [
        record.age.map(f64::from),
        record.vitals.bmi(),
        record.vitals.systolic_bp,
        record.vitals.diastolic_bp,
        record.vitals.heart_rate,
        record.labs.fasting_glucose,
        record.labs.hba1c,
        record.labs.total_cholesterol,
        record.labs.ldl_cholesterol,
        record.labs.hdl_cholesterol,
        record.labs.triglycerides,
    ]
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
