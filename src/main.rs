use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use wellpath::config::{self, AnalysisConfig};
use wellpath::db::{DatabaseError, InMemoryPatientStore, PatientStore, SqlitePatientStore};
use wellpath::error::AnalysisError;
use wellpath::models::PatientRecord;
use wellpath::sample_data::{demo_patient, sample_population};
use wellpath::service::WellnessAssistant;

const DEFAULT_PATIENT: &str = "PT-2024-7891";

/// Assign a patient to a similarity group and print their wellness plan as JSON
#[derive(Parser, Debug)]
#[command(name = "wellpath", version, long_about = None)]
struct Cli {
    /// Patient id, or a fragment of their name
    #[arg(value_name = "PATIENT", default_value = DEFAULT_PATIENT)]
    query: String,

    /// SQLite patient database, seeded with the sample records when empty.
    /// Without one the sample records are served from memory
    #[arg(long, env = "WELLPATH_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Saved model bundle. Loaded when it exists, written after training otherwise
    #[arg(long, env = "WELLPATH_MODEL", value_name = "PATH")]
    model: Option<PathBuf>,

    /// Use the platform data directory for any database or model path not given
    #[arg(long)]
    default_paths: bool,

    /// Number of similarity groups
    #[arg(long)]
    clusters: Option<usize>,

    /// Seed for every random choice made while fitting
    #[arg(long)]
    seed: Option<u64>,

    /// Lowest silhouette score a freshly trained model may have
    #[arg(long, allow_hyphen_values = true)]
    min_quality: Option<f64>,
}

impl Cli {
    fn database_path(&self) -> Option<PathBuf> {
        self.database
            .clone()
            .or_else(|| self.default_paths.then(config::default_database_path))
    }

    fn model_path(&self) -> Option<PathBuf> {
        self.model
            .clone()
            .or_else(|| self.default_paths.then(config::default_model_path))
    }

    /// `WELLPATH_*` settings with command-line overrides on top.
    fn analysis_config(&self) -> Result<AnalysisConfig, AnalysisError> {
        let mut config = AnalysisConfig::from_env()?;
        if let Some(clusters) = self.clusters {
            config.n_clusters = clusters;
        }
        if let Some(seed) = self.seed {
            config.random_seed = seed;
        }
        if let Some(min_quality) = self.min_quality {
            config.min_quality_score = min_quality;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Training interrupted")]
    Cancelled,

    #[error("Training worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Model quality {score:.3} is below the required minimum {minimum:.3}")]
    QualityTooLow { score: f64, minimum: f64 },

    #[error("No patient matches '{0}'")]
    PatientNotFound(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Wellness plan generation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.analysis_config()?;
    let store = open_store(cli.database_path())?;
    let assistant = Arc::new(WellnessAssistant::new(config));

    match cli.model_path() {
        Some(path) if path.exists() => {
            let report = assistant.install_from_path(&path)?;
            tracing::info!(path = %path.display(), clusters = report.n_clusters, "Loaded saved model");
        }
        saved => {
            train(&assistant, store.list_all()?).await?;
            if let Some(path) = saved {
                assistant.model()?.save(&path)?;
            }
        }
    }

    let record = find_patient(store.as_ref(), &cli.query)?;
    let plan = assistant.generate_plan(&record)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Fit on a blocking worker. Ctrl-C abandons the candidate; nothing is
/// installed unless the fit finishes and clears the quality bar.
async fn train(assistant: &Arc<WellnessAssistant>, population: Vec<PatientRecord>) -> Result<(), CliError> {
    let worker = Arc::clone(assistant);
    let fit = tokio::task::spawn_blocking(move || worker.fit_candidate(&population));

    let candidate = tokio::select! {
        joined = fit => joined??,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, discarding training run");
            return Err(CliError::Cancelled);
        }
    };

    let report = candidate.report();
    let minimum = assistant.config().min_quality_score;
    if report.quality_score < minimum {
        return Err(CliError::QualityTooLow {
            score: report.quality_score,
            minimum,
        });
    }

    tracing::info!(
        clusters = report.n_clusters,
        quality = report.quality_score,
        inertia = report.inertia,
        labels = ?report.cluster_labels,
        "Training complete"
    );
    assistant.install(candidate);
    Ok(())
}

/// SQLite store at `path`, seeded with the sample records if empty.
/// Otherwise the sample records in memory.
fn open_store(path: Option<PathBuf>) -> Result<Box<dyn PatientStore>, CliError> {
    let samples = || sample_population().into_iter().chain([demo_patient()]);

    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(AnalysisError::from)?;
            }
            let store = SqlitePatientStore::open(&path)?;
            if store.count()? == 0 {
                for record in samples() {
                    store.insert(&record)?;
                }
                tracing::info!(path = %path.display(), "Seeded patient database");
            }
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryPatientStore::with_records(samples()))),
    }
}

/// Exact id first, then the first name match.
fn find_patient(store: &dyn PatientStore, query: &str) -> Result<PatientRecord, CliError> {
    match store.find_by_id(query) {
        Ok(record) => Ok(record),
        Err(DatabaseError::NotFound { .. }) => store
            .find_by_name(query)?
            .into_iter()
            .next()
            .ok_or_else(|| CliError::PatientNotFound(query.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_targets_demo_patient() {
        let cli = Cli::try_parse_from(["wellpath"]).unwrap();
        assert_eq!(cli.query, DEFAULT_PATIENT);
        assert!(!cli.default_paths);
        assert!(cli.clusters.is_none());
    }

    #[test]
    fn options_parse_and_override_config() {
        let cli = Cli::try_parse_from([
            "wellpath",
            "Sharma",
            "--database",
            "/tmp/patients.db",
            "--model",
            "/tmp/model.json",
            "--clusters",
            "3",
            "--seed",
            "7",
            "--min-quality",
            "-0.5",
        ])
        .unwrap();

        assert_eq!(cli.query, "Sharma");
        assert_eq!(cli.database_path(), Some(PathBuf::from("/tmp/patients.db")));
        assert_eq!(cli.model_path(), Some(PathBuf::from("/tmp/model.json")));

        let config = cli.analysis_config().unwrap();
        assert_eq!(config.n_clusters, 3);
        assert_eq!(config.random_seed, 7);
        assert_eq!(config.min_quality_score, -0.5);
    }

    #[test]
    fn default_paths_fill_only_missing_locations() {
        let cli = Cli::try_parse_from(["wellpath", "--default-paths", "--model", "m.json"]).unwrap();
        assert_eq!(cli.database_path(), Some(config::default_database_path()));
        assert_eq!(cli.model_path(), Some(PathBuf::from("m.json")));
    }

    #[test]
    fn zero_clusters_is_rejected() {
        let cli = Cli::try_parse_from(["wellpath", "--clusters", "0"]).unwrap();
        assert!(matches!(
            cli.analysis_config(),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn lookup_falls_back_to_name_search() {
        let store = InMemoryPatientStore::with_records(
            sample_population().into_iter().chain([demo_patient()]),
        );
        let by_id = find_patient(&store, DEFAULT_PATIENT).unwrap();
        assert_eq!(by_id.patient_id, DEFAULT_PATIENT);

        let fragment = by_id.name.split_whitespace().next().unwrap().to_lowercase();
        assert!(find_patient(&store, &fragment).is_ok());
        assert!(matches!(
            find_patient(&store, "no such person"),
            Err(CliError::PatientNotFound(_))
        ));
    }
}
