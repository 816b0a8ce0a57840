use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::FEATURE_COUNT;
use crate::error::AnalysisError;

/// Application-level constants
pub const APP_NAME: &str = "Wellpath";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "WELLPATH_";

/// Get the application data directory
/// ~/Wellpath/ on all platforms. Falls back to the working directory when
/// no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the fitted model bundle directory
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Default location of the serving model bundle.
pub fn default_model_path() -> PathBuf {
    models_dir().join("wellness_model.json")
}

/// Default location of the patient database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("patients.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,wellpath=debug"
}

// ═══════════════════════════════════════════════════════════
// Analysis configuration
// ═══════════════════════════════════════════════════════════

/// Parameters for fitting the clustering and pattern models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of similarity groups (K).
    pub n_clusters: usize,
    /// Number of pattern axes (M). Must be below the feature count.
    pub pca_components: usize,
    /// Seed for every random choice made during fitting.
    pub random_seed: u64,
    /// Number of independent k-means restarts; the lowest-inertia run wins.
    pub n_init: usize,
    /// Iteration cap for a single k-means run.
    pub max_iterations: usize,
    /// How many top-loading features label each pattern axis.
    pub top_loadings: usize,
    /// Minimum silhouette score the training trigger accepts before
    /// installing a model. Not enforced by `fit` itself.
    pub min_quality_score: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            pca_components: 3,
            random_seed: 42,
            n_init: 10,
            max_iterations: 300,
            top_loadings: 3,
            min_quality_score: -1.0,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by `WELLPATH_*` environment variables.
    ///
    /// Recognized: `WELLPATH_CLUSTERS`, `WELLPATH_PCA_COMPONENTS`,
    /// `WELLPATH_RANDOM_SEED`, `WELLPATH_N_INIT`, `WELLPATH_MAX_ITERATIONS`,
    /// `WELLPATH_TOP_LOADINGS`, `WELLPATH_MIN_QUALITY`.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build a config from an arbitrary key lookup (keys without prefix).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("CLUSTERS") {
            config.n_clusters = parse_value("CLUSTERS", &v)?;
        }
        if let Some(v) = lookup("PCA_COMPONENTS") {
            config.pca_components = parse_value("PCA_COMPONENTS", &v)?;
        }
        if let Some(v) = lookup("RANDOM_SEED") {
            config.random_seed = parse_value("RANDOM_SEED", &v)?;
        }
        if let Some(v) = lookup("N_INIT") {
            config.n_init = parse_value("N_INIT", &v)?;
        }
        if let Some(v) = lookup("MAX_ITERATIONS") {
            config.max_iterations = parse_value("MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("TOP_LOADINGS") {
            config.top_loadings = parse_value("TOP_LOADINGS", &v)?;
        }
        if let Some(v) = lookup("MIN_QUALITY") {
            config.min_quality_score = parse_value("MIN_QUALITY", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a model.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.n_clusters == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "n_clusters must be at least 1".into(),
            ));
        }
        if self.pca_components == 0 || self.pca_components >= FEATURE_COUNT {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "pca_components must be in 1..{FEATURE_COUNT}, got {}",
                self.pca_components
            )));
        }
        if self.n_init == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "n_init must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.top_loadings == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "top_loadings must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AnalysisError> {
    raw.trim().parse::<T>().map_err(|_| {
        AnalysisError::InvalidConfiguration(format!("{ENV_PREFIX}{key}: cannot parse '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("Wellpath"));
    }

    #[test]
    fn model_path_under_models_dir() {
        let path = default_model_path();
        assert!(path.starts_with(models_dir()));
        assert!(path.ends_with("wellness_model.json"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert_eq!(config.n_clusters, 5);
        assert_eq!(config.pca_components, 3);
        assert_eq!(config.random_seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_clusters_rejected() {
        let config = AnalysisConfig {
            n_clusters: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn pca_components_must_be_below_feature_count() {
        let config = AnalysisConfig {
            pca_components: FEATURE_COUNT,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfiguration(_))
        ));

        let config = AnalysisConfig {
            pca_components: FEATURE_COUNT - 1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config =
            AnalysisConfig::from_lookup(lookup_from(&[("CLUSTERS", "4"), ("RANDOM_SEED", " 7 ")]))
                .unwrap();
        assert_eq!(config.n_clusters, 4);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.pca_components, 3);
    }

    #[test]
    fn lookup_rejects_garbage() {
        let result = AnalysisConfig::from_lookup(lookup_from(&[("CLUSTERS", "five")]));
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidConfiguration(msg)) if msg.contains("WELLPATH_CLUSTERS")
        ));
    }

    #[test]
    fn lookup_validates_result() {
        let result = AnalysisConfig::from_lookup(lookup_from(&[("PCA_COMPONENTS", "0")]));
        assert!(result.is_err());
    }
}
