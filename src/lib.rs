//! Wellpath: patient similarity grouping and rule-driven wellness plans.
//!
//! A [`analysis::FittedModel`] is fit once on a population and then only
//! read. Plans combine its cluster assignment and pattern reading with a
//! risk assessment computed from raw values alone.

pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sample_data;
pub mod service;
pub mod wellness;

pub use analysis::FittedModel;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use models::PatientRecord;
pub use service::WellnessAssistant;
pub use wellness::{generate_plan, WellnessPlan};
