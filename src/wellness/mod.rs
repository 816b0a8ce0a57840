pub mod assembler;
pub mod bands;
pub mod catalog;
pub mod messages;
pub mod recommend;
pub mod risk;
pub mod rules;
pub mod safety;
pub mod types;

pub use assembler::{assemble, generate_plan};
pub use bands::{BandTable, BAND_TABLES, CRISIS_WEIGHT};
pub use messages::MessageTemplates;
pub use recommend::{fitness_level, recommend, RecommendationSet};
pub use risk::assess_risk;
pub use rules::{fired_rules, Rule, RuleContext, RULES};
pub use safety::safety_alerts;
pub use types::*;
