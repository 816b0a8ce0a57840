//! Patient similarity analysis.
//!
//! Pipeline: record → [`FeatureExtractor`] → [`Normalizer`] →
//! {[`ClusterModel`], [`PatternReducer`]}. [`FittedModel`] freezes every
//! fitted stage into one value that inference only reads.

pub mod features;
pub mod kmeans;
pub mod model;
pub mod normalizer;
pub mod patterns;
pub mod profile;
pub mod types;

pub use features::{FeatureExtractor, FeatureMedians};
pub use kmeans::{silhouette_score, ClusterModel, KMeansParams};
pub use model::FittedModel;
pub use normalizer::{Normalizer, STD_EPSILON};
pub use patterns::{FeatureLoading, PatternAxis, PatternReducer};
pub use profile::{build_profiles, ClusterProfile};
pub use types::*;
