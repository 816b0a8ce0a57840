//! Serving state for the wellness assistant.
//!
//! The fitted model sits behind a `RwLock<Option<Arc<_>>>`. Readers clone
//! the `Arc` and release the lock before doing any work; training builds a
//! candidate off-lock and only a successful fit is swapped in.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::analysis::{FittedModel, TrainingReport};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::PatientRecord;
use crate::wellness::{self, RiskAssessment, WellnessPlan};

pub struct WellnessAssistant {
    config: AnalysisConfig,
    model: RwLock<Option<Arc<FittedModel>>>,
}

impl WellnessAssistant {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            model: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Fit a candidate without touching the serving model.
    pub fn fit_candidate(&self, population: &[PatientRecord]) -> Result<FittedModel, AnalysisError> {
        FittedModel::fit(population, &self.config)
    }

    /// Make `model` the serving model. Returns the one it replaced.
    pub fn install(&self, model: FittedModel) -> Option<Arc<FittedModel>> {
        let report = model.report();
        let mut slot = self.model.write().unwrap_or_else(PoisonError::into_inner);
        let previous = slot.replace(Arc::new(model));
        tracing::info!(
            clusters = report.n_clusters,
            samples = report.n_samples,
            quality = report.quality_score,
            replaced = previous.is_some(),
            "Model installed"
        );
        previous
    }

    /// Fit on `population` and install on success. On failure the
    /// previous model keeps serving.
    pub fn train(&self, population: &[PatientRecord]) -> Result<TrainingReport, AnalysisError> {
        let candidate = match self.fit_candidate(population) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(error = %e, "Training failed, keeping current model");
                return Err(e);
            }
        };
        let report = candidate.report();
        self.install(candidate);
        Ok(report)
    }

    /// Load a saved bundle and install it.
    pub fn install_from_path(&self, path: &Path) -> Result<TrainingReport, AnalysisError> {
        let model = FittedModel::load(path)?;
        let report = model.report();
        self.install(model);
        Ok(report)
    }

    pub fn is_trained(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The serving model, or `ModelNotTrained`.
    pub fn model(&self) -> Result<Arc<FittedModel>, AnalysisError> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AnalysisError::ModelNotTrained)
    }

    /// Risk needs no model.
    pub fn assess_risk(&self, record: &PatientRecord) -> RiskAssessment {
        wellness::assess_risk(record)
    }

    pub fn generate_plan(&self, record: &PatientRecord) -> Result<WellnessPlan, AnalysisError> {
        let model = self.model()?;
        wellness::generate_plan(&model, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskTier;
    use crate::sample_data::{demo_patient, sample_population};

    fn assistant() -> WellnessAssistant {
        WellnessAssistant::new(AnalysisConfig::default())
    }

    #[test]
    fn plan_before_training_is_model_not_trained() {
        let assistant = assistant();
        assert!(!assistant.is_trained());
        assert!(matches!(
            assistant.generate_plan(&demo_patient()),
            Err(AnalysisError::ModelNotTrained)
        ));
    }

    #[test]
    fn risk_available_without_model() {
        assert_eq!(assistant().assess_risk(&demo_patient()).tier, RiskTier::High);
    }

    #[test]
    fn train_then_plan() {
        let assistant = assistant();
        let report = assistant.train(&sample_population()).unwrap();
        assert_eq!(report.n_clusters, 5);
        assert!(assistant.is_trained());

        let plan = assistant.generate_plan(&demo_patient()).unwrap();
        assert_eq!(plan.patient_id, "PT-2024-7891");
    }

    #[test]
    fn failed_retrain_keeps_previous_model() {
        let assistant = assistant();
        assistant.train(&sample_population()).unwrap();
        let before = assistant.model().unwrap();

        let too_small: Vec<_> = sample_population().into_iter().take(2).collect();
        assert!(matches!(
            assistant.train(&too_small),
            Err(AnalysisError::InsufficientData(_))
        ));

        let after = assistant.model().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn install_returns_replaced_model() {
        let assistant = assistant();
        let first = assistant.fit_candidate(&sample_population()).unwrap();
        assert!(assistant.install(first).is_none());

        let second = assistant.fit_candidate(&sample_population()).unwrap();
        assert!(assistant.install(second).is_some());
    }

    #[test]
    fn installs_saved_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        assistant()
            .fit_candidate(&sample_population())
            .unwrap()
            .save(&path)
            .unwrap();

        let assistant = assistant();
        assistant.install_from_path(&path).unwrap();
        assert!(assistant.generate_plan(&demo_patient()).is_ok());
    }
}
