use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::{ConfidenceTier, PatientRecord};

use super::features::FeatureExtractor;
use super::kmeans::{ClusterModel, KMeansParams};
use super::normalizer::Normalizer;
use super::patterns::PatternReducer;
use super::profile::{build_profiles, ClusterProfile};
use super::types::{
    feature_schema_fingerprint, ClusterAssignment, FeatureVector, ModelAnalysis, TrainingReport,
    FEATURE_SCHEMA_VERSION,
};

/// Everything inference needs, frozen at fit time.
///
/// Built once by [`FittedModel::fit`] (or loaded from a bundle) and then
/// only read. Share it through `Arc`; replacing a model means building a
/// new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    schema_version: u32,
    schema_fingerprint: String,
    config: AnalysisConfig,
    extractor: FeatureExtractor,
    normalizer: Normalizer,
    clusters: ClusterModel,
    profiles: Vec<ClusterProfile>,
    patterns: PatternReducer,
    trained_at: DateTime<Utc>,
    training_size: usize,
}

impl FittedModel {
    /// Fit extractor medians, normalizer, clusters, profiles and pattern
    /// axes on one population. Pure: no shared state is touched, so a
    /// failure leaves nothing behind.
    pub fn fit(population: &[PatientRecord], config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        if population.len() < 2 {
            return Err(AnalysisError::InsufficientData(format!(
                "need at least 2 records, got {}",
                population.len()
            )));
        }
        if population.len() < config.n_clusters {
            return Err(AnalysisError::InsufficientData(format!(
                "{} records cannot form {} clusters",
                population.len(),
                config.n_clusters
            )));
        }

        tracing::info!(
            records = population.len(),
            clusters = config.n_clusters,
            seed = config.random_seed,
            "Fitting wellness model"
        );

        let extractor = FeatureExtractor::fit(population)?;
        let raw: Vec<FeatureVector> = population
            .iter()
            .map(|r| extractor.extract(r))
            .collect::<Result<_, _>>()?;

        let normalizer = Normalizer::fit(&raw)?;
        let normalized = normalizer.transform_all(&raw);

        let (clusters, labels) = ClusterModel::fit(
            &normalized,
            KMeansParams {
                k: config.n_clusters,
                n_init: config.n_init,
                max_iterations: config.max_iterations,
                seed: config.random_seed,
            },
        )?;

        let profiles = build_profiles(population, &labels, config.n_clusters);
        let patterns =
            PatternReducer::fit(&normalized, config.pca_components, config.top_loadings)?;

        tracing::info!(
            quality = clusters.silhouette(),
            inertia = clusters.inertia(),
            iterations = clusters.iterations(),
            "Wellness model fitted"
        );

        Ok(Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            schema_fingerprint: feature_schema_fingerprint(),
            config: config.clone(),
            extractor,
            normalizer,
            clusters,
            profiles,
            patterns,
            trained_at: Utc::now(),
            training_size: population.len(),
        })
    }

    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            n_samples: self.training_size,
            n_clusters: self.clusters.k(),
            quality_score: self.clusters.silhouette(),
            inertia: self.clusters.inertia(),
            cluster_sizes: self.clusters.sizes().to_vec(),
            cluster_labels: self.profiles.iter().map(|p| p.label.clone()).collect(),
            explained_variance_ratio: self.patterns.explained_variance_ratio(),
            iterations: self.clusters.iterations(),
        }
    }

    /// Extract and normalize one record.
    pub fn normalize(&self, record: &PatientRecord) -> Result<FeatureVector, AnalysisError> {
        let raw = self.extractor.extract(record)?;
        Ok(self.normalizer.transform(&raw))
    }

    /// Nearest cluster for an already normalized vector.
    pub fn assign(&self, normalized: &FeatureVector) -> ClusterAssignment {
        let (cluster_id, distance) = self.clusters.assign(normalized);
        let similarity = self.clusters.similarity(distance);

        let (label, description) = self
            .profiles
            .get(cluster_id)
            .map(|p| (p.label.clone(), p.description.clone()))
            .unwrap_or_else(|| (format!("Cluster {cluster_id}"), String::new()));

        ClusterAssignment {
            cluster_id,
            label,
            description,
            similarity,
            confidence: ConfidenceTier::from_similarity(similarity),
            distance,
        }
    }

    /// Cluster assignment plus pattern interpretation for one record.
    pub fn analyze(&self, record: &PatientRecord) -> Result<ModelAnalysis, AnalysisError> {
        let normalized = self.normalize(record)?;
        Ok(ModelAnalysis {
            assignment: self.assign(&normalized),
            patterns: self.patterns.interpret(&normalized),
        })
    }

    pub fn profile(&self, cluster_id: usize) -> Option<&ClusterProfile> {
        self.profiles.get(cluster_id)
    }

    pub fn profiles(&self) -> &[ClusterProfile] {
        &self.profiles
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn clusters(&self) -> &ClusterModel {
        &self.clusters
    }

    pub fn patterns(&self) -> &PatternReducer {
        &self.patterns
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Write the model as a JSON bundle, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), AnalysisError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Model bundle saved");
        Ok(())
    }

    /// Read a bundle written by [`FittedModel::save`]. Bundles from another
    /// feature schema are refused.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let json = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;

        let expected = feature_schema_fingerprint();
        if model.schema_version != FEATURE_SCHEMA_VERSION || model.schema_fingerprint != expected {
            return Err(AnalysisError::IncompatibleModel {
                expected: format!("v{FEATURE_SCHEMA_VERSION}/{expected}"),
                found: format!("v{}/{}", model.schema_version, model.schema_fingerprint),
            });
        }

        tracing::info!(
            path = %path.display(),
            clusters = model.clusters.k(),
            "Model bundle loaded"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, LabResults, MedicalHistory, VitalSigns};
    use crate::sample_data::sample_population;

    fn small_config(k: usize) -> AnalysisConfig {
        AnalysisConfig {
            n_clusters: k,
            n_init: 4,
            ..AnalysisConfig::default()
        }
    }

    fn outlier() -> PatientRecord {
        PatientRecord {
            vitals: VitalSigns {
                systolic_bp: Some(260.0),
                diastolic_bp: Some(150.0),
                heart_rate: Some(160.0),
                bmi: Some(70.0),
                ..Default::default()
            },
            labs: LabResults {
                fasting_glucose: Some(600.0),
                hba1c: Some(15.0),
                total_cholesterol: Some(500.0),
                ldl_cholesterol: Some(400.0),
                hdl_cholesterol: Some(5.0),
                triglycerides: Some(1500.0),
                ..Default::default()
            },
            history: MedicalHistory::new(
                ["A", "B", "C", "D", "E", "F", "G", "H"],
                ["m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8"],
            ),
            ..PatientRecord::new("far", "Far Away", Some(99), Gender::Other)
        }
    }

    #[test]
    fn sample_population_fills_five_clusters() {
        let population = sample_population();
        let model = FittedModel::fit(&population, &AnalysisConfig::default()).unwrap();
        let report = model.report();

        assert_eq!(report.n_samples, 8);
        assert_eq!(report.n_clusters, 5);
        assert!(report.cluster_sizes.iter().all(|&s| s > 0));
        assert_eq!(report.cluster_labels.len(), 5);
        assert_eq!(report.explained_variance_ratio.len(), 3);
        assert!((-1.0..=1.0).contains(&report.quality_score));
    }

    #[test]
    fn fit_is_deterministic_per_seed() {
        let population = sample_population();
        let a = FittedModel::fit(&population, &small_config(3)).unwrap();
        let b = FittedModel::fit(&population, &small_config(3)).unwrap();

        assert_eq!(a.clusters(), b.clusters());
        assert_eq!(a.profiles(), b.profiles());
        assert_eq!(a.patterns(), b.patterns());
    }

    #[test]
    fn extracted_record_survives_normalize_round_trip() {
        let population = sample_population();
        let model = FittedModel::fit(&population, &small_config(3)).unwrap();

        for record in population.iter().chain([crate::sample_data::demo_patient()].iter()) {
            let raw = model.extractor().extract(record).unwrap();
            let normalized = model.normalizer().transform(&raw);
            let restored = model.normalizer().inverse_transform(&normalized);

            for (i, (a, b)) in raw.iter().zip(restored.iter()).enumerate() {
                let tolerance = 1e-9 * a.abs().max(1.0);
                assert!((a - b).abs() < tolerance, "feature {i}: {a} became {b}");
            }
            assert_eq!(model.normalize(record).unwrap(), normalized);
        }
    }

    #[test]
    fn analysis_is_idempotent_and_bounded() {
        let population = sample_population();
        let model = FittedModel::fit(&population, &small_config(3)).unwrap();

        for record in &population {
            let first = model.analyze(record).unwrap();
            let second = model.analyze(record).unwrap();
            assert_eq!(first, second);
            assert!((0.0..=1.0).contains(&first.assignment.similarity));
            assert_eq!(
                first.assignment.confidence,
                ConfidenceTier::from_similarity(first.assignment.similarity)
            );
        }
    }

    #[test]
    fn far_record_gets_zero_similarity() {
        let model = FittedModel::fit(&sample_population(), &small_config(3)).unwrap();
        let analysis = model.analyze(&outlier()).unwrap();

        assert_eq!(analysis.assignment.similarity, 0.0);
        assert_eq!(analysis.assignment.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn too_few_records_for_k() {
        let population: Vec<_> = sample_population().into_iter().take(3).collect();
        let err = FittedModel::fit(&population, &small_config(5)).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn invalid_config_rejected_before_fitting() {
        let config = AnalysisConfig {
            n_clusters: 0,
            ..AnalysisConfig::default()
        };
        let err = FittedModel::fit(&sample_population(), &config).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfiguration(_)));
    }

    #[test]
    fn analyze_rejects_missing_identifier() {
        let model = FittedModel::fit(&sample_population(), &small_config(3)).unwrap();
        let mut record = outlier();
        record.patient_id = String::new();
        let err = model.analyze(&record).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRecord { .. }));
    }

    #[test]
    fn bundle_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("bundle.json");

        let model = FittedModel::fit(&sample_population(), &small_config(3)).unwrap();
        model.save(&path).unwrap();
        let loaded = FittedModel::load(&path).unwrap();

        assert_eq!(loaded.clusters(), model.clusters());
        assert_eq!(loaded.profiles(), model.profiles());
        let record = &sample_population()[0];
        assert_eq!(
            loaded.analyze(record).unwrap().assignment.cluster_id,
            model.analyze(record).unwrap().assignment.cluster_id
        );
    }

    #[test]
    fn bundle_with_other_schema_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");

        let model = FittedModel::fit(&sample_population(), &small_config(3)).unwrap();
        model.save(&path).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["schema_fingerprint"] = serde_json::Value::String("stale".into());
        fs::write(&path, value.to_string()).unwrap();

        let err = FittedModel::load(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::IncompatibleModel { .. }));
    }
}
