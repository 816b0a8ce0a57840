use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{ClusterAssignment, PatternInterpretation};
use crate::models::{ClinicalParameter, FitnessLevel, FollowUpInterval, RiskTier};

/// Attached to every supplement suggestion.
pub const SUPPLEMENT_ADVISORY: &str = "Consult physician before use";

pub const PLAN_DISCLAIMER: &str = "This wellness plan is informational and does not replace \
     professional medical advice, diagnosis, or treatment. Always consult a qualified \
     healthcare provider before changing diet, exercise, medication, or supplements.";

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// One parameter that landed in a scoring band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub parameter: ClinicalParameter,
    pub band: String,
    /// Raw value that was classified.
    pub value: f64,
    /// Lower bound of the band the value fell in.
    pub threshold: f64,
    pub weight: u32,
    pub crisis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// Crisis factors first, then weighted factors in table order.
    pub factors: Vec<RiskFactor>,
    pub weighted_count: u32,
    pub follow_up: FollowUpInterval,
}

impl RiskAssessment {
    pub fn crisis_factors(&self) -> impl Iterator<Item = &RiskFactor> {
        self.factors.iter().filter(|f| f.crisis)
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecommendation {
    pub foods_to_emphasize: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub meal_planning_tips: Vec<String>,
    pub hydration: String,
    pub special_considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleRecommendation {
    pub fitness_level: FitnessLevel,
    pub aerobic: String,
    pub strength: String,
    pub flexibility: String,
    pub frequency: String,
    pub duration: String,
    pub sleep: Vec<String>,
    pub stress_management: Vec<String>,
    pub activity_modifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplement {
    pub name: String,
    pub dosage: String,
    pub timing: String,
    pub advisory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementRecommendation {
    /// Unique by name, first suggestion kept.
    pub supplements: Vec<Supplement>,
    pub contraindications: Vec<String>,
    pub interaction_warnings: Vec<String>,
    pub monitoring: Vec<String>,
}

// ---------------------------------------------------------------------------
// Safety
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyWarning {
    pub parameter: ClinicalParameter,
    pub message: String,
    pub refer_to_specialist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAlerts {
    pub risk_tier: RiskTier,
    pub warnings: Vec<SafetyWarning>,
    pub specialist_referrals: Vec<String>,
    pub warning_signs: Vec<String>,
    pub immediate_actions: Vec<String>,
    pub follow_up: FollowUpInterval,
    pub follow_up_description: String,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Group summary carried into the plan alongside the assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub characteristics: Vec<String>,
    pub typical_conditions: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Complete wellness report for one record. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessPlan {
    pub id: Uuid,
    pub patient_id: String,
    pub assignment: ClusterAssignment,
    pub group: GroupSummary,
    pub patterns: PatternInterpretation,
    pub risk: RiskAssessment,
    /// Names of the rules that fired, in evaluation order.
    pub rules_applied: Vec<String>,
    pub nutrition: NutritionRecommendation,
    pub lifestyle: LifestyleRecommendation,
    pub supplements: SupplementRecommendation,
    pub safety: SafetyAlerts,
    pub generated_at: DateTime<Utc>,
    pub disclaimer: String,
}
