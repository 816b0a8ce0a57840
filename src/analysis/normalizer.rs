use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

use super::types::{FeatureVector, FEATURE_COUNT};

/// Floor for a feature's standard deviation. Constant columns (one-hot
/// gender on a single-gender population, say) divide by this instead of zero.
pub const STD_EPSILON: f64 = 1e-8;

/// Per-feature standardization with statistics frozen at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    means: FeatureVector,
    std_devs: FeatureVector,
}

impl Normalizer {
    /// Mean and population standard deviation of every feature.
    pub fn fit(vectors: &[FeatureVector]) -> Result<Self, AnalysisError> {
        if vectors.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 records to normalize, got {}",
                vectors.len()
            )));
        }

        let n = vectors.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        let mut std_devs = [0.0; FEATURE_COUNT];

        for j in 0..FEATURE_COUNT {
            let mean = vectors.iter().map(|v| v[j]).sum::<f64>() / n;
            let variance = vectors.iter().map(|v| (v[j] - mean).powi(2)).sum::<f64>() / n;
            means[j] = mean;
            std_devs[j] = variance.sqrt();
        }

        if std_devs.iter().all(|s| *s < STD_EPSILON) {
            return Err(AnalysisError::InsufficientData(
                "every feature is constant across the population".into(),
            ));
        }

        for s in std_devs.iter_mut() {
            *s = s.max(STD_EPSILON);
        }

        Ok(Self { means, std_devs })
    }

    pub fn transform(&self, vector: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = (vector[j] - self.means[j]) / self.std_devs[j];
        }
        out
    }

    pub fn transform_all(&self, vectors: &[FeatureVector]) -> Vec<FeatureVector> {
        vectors.iter().map(|v| self.transform(v)).collect()
    }

    /// Map a normalized vector back to raw feature units.
    pub fn inverse_transform(&self, normalized: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = normalized[j] * self.std_devs[j] + self.means[j];
        }
        out
    }

    pub fn means(&self) -> &FeatureVector {
        &self.means
    }

    pub fn std_devs(&self) -> &FeatureVector {
        &self.std_devs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(seed: f64) -> FeatureVector {
        let mut v = [0.0; FEATURE_COUNT];
        for (j, slot) in v.iter_mut().enumerate() {
            *slot = seed * (j as f64 + 1.0);
        }
        // Constant indicator column.
        v[17] = 1.0;
        v
    }

    #[test]
    fn transformed_training_data_has_zero_mean_unit_variance() {
        let data: Vec<_> = [1.0, 2.0, 3.0, 4.0].iter().map(|s| vector(*s)).collect();
        let normalizer = Normalizer::fit(&data).unwrap();
        let out = normalizer.transform_all(&data);

        for j in 0..17 {
            let mean: f64 = out.iter().map(|v| v[j]).sum::<f64>() / 4.0;
            let var: f64 = out.iter().map(|v| (v[j] - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-9, "feature {j} mean {mean}");
            assert!((var - 1.0).abs() < 1e-9, "feature {j} variance {var}");
        }
    }

    #[test]
    fn constant_feature_is_clamped_not_nan() {
        let data: Vec<_> = [1.0, 2.0, 3.0].iter().map(|s| vector(*s)).collect();
        let normalizer = Normalizer::fit(&data).unwrap();

        assert_eq!(normalizer.std_devs()[17], STD_EPSILON);
        let out = normalizer.transform(&data[0]);
        assert_eq!(out[17], 0.0);
        assert!(out.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn round_trip_restores_raw_values() {
        let data: Vec<_> = [10.0, 20.5, 31.0].iter().map(|s| vector(*s)).collect();
        let normalizer = Normalizer::fit(&data).unwrap();

        let raw = vector(17.25);
        let back = normalizer.inverse_transform(&normalizer.transform(&raw));
        for j in 0..FEATURE_COUNT {
            assert!((back[j] - raw[j]).abs() < 1e-9, "feature {j}");
        }
    }

    #[test]
    fn single_record_is_insufficient() {
        let err = Normalizer::fit(&[vector(1.0)]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn all_constant_population_is_insufficient() {
        let err = Normalizer::fit(&[vector(2.0), vector(2.0), vector(2.0)]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(ref m) if m.contains("constant")));
    }
}
