use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::ConfidenceTier;

// ---------------------------------------------------------------------------
// Feature schema
// ---------------------------------------------------------------------------

/// Length of every feature vector.
pub const FEATURE_COUNT: usize = 18;

/// Bumped whenever `FEATURE_NAMES` changes meaning or order.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Feature order shared by extraction, normalization and clustering.
/// Changing it invalidates every previously fitted model.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "bmi",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "fasting_glucose",
    "hba1c",
    "total_cholesterol",
    "ldl_cholesterol",
    "hdl_cholesterol",
    "triglycerides",
    "num_conditions",
    "num_medications",
    "family_diabetes",
    "family_heart_disease",
    "gender_male",
    "gender_female",
    "gender_other",
];

/// Reader-facing names, same order as `FEATURE_NAMES`.
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "age",
    "BMI",
    "systolic blood pressure",
    "diastolic blood pressure",
    "heart rate",
    "fasting glucose",
    "HbA1c",
    "total cholesterol",
    "LDL cholesterol",
    "HDL cholesterol",
    "triglycerides",
    "number of conditions",
    "number of medications",
    "family history of diabetes",
    "family history of heart disease",
    "male",
    "female",
    "other gender",
];

/// Fixed-order numeric encoding of one patient record.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// SHA-256 over the schema version and ordered feature names, hex encoded.
pub fn feature_schema_fingerprint() -> String {
    let mut hasher = Sha256::new();
    hasher.update(FEATURE_SCHEMA_VERSION.to_le_bytes());
    for name in FEATURE_NAMES {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Inference outputs
// ---------------------------------------------------------------------------

/// Nearest similarity group for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub cluster_id: usize,
    pub label: String,
    /// Profile description captured at training time.
    pub description: String,
    /// 1 at the centroid, 0 at or beyond the training radius.
    pub similarity: f64,
    pub confidence: ConfidenceTier,
    /// Euclidean distance to the centroid in normalized space.
    pub distance: f64,
}

/// Where a record sits on one pattern axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReading {
    /// 1-based axis number.
    pub axis: usize,
    pub coordinate: f64,
    pub explained_variance_ratio: f64,
    /// Reader-facing names of the top-loading features.
    pub drivers: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInterpretation {
    pub readings: Vec<PatternReading>,
    /// Sum of absolute loadings per feature across all axes.
    pub feature_importance: BTreeMap<String, f64>,
}

impl PatternInterpretation {
    pub fn coordinates(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.coordinate).collect()
    }
}

/// Everything the fitted model says about one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnalysis {
    pub assignment: ClusterAssignment,
    pub patterns: PatternInterpretation,
}

/// Summary returned by a successful fit. The training trigger decides
/// whether `quality_score` is good enough to serve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_samples: usize,
    pub n_clusters: usize,
    /// Silhouette coefficient in [-1, 1].
    pub quality_score: f64,
    pub inertia: f64,
    pub cluster_sizes: Vec<usize>,
    pub cluster_labels: Vec<String>,
    pub explained_variance_ratio: Vec<f64>,
    pub iterations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_labels_align() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_LABELS.len());
        assert_eq!(FEATURE_NAMES[5], "fasting_glucose");
        assert_eq!(FEATURE_LABELS[5], "fasting glucose");
    }

    #[test]
    fn feature_names_unique() {
        let unique: std::collections::HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = feature_schema_fingerprint();
        let b = feature_schema_fingerprint();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
