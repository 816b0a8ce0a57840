use chrono::Utc;
use uuid::Uuid;

use crate::analysis::{FittedModel, ModelAnalysis};
use crate::error::AnalysisError;
use crate::models::PatientRecord;

use super::recommend::{recommend, RecommendationSet};
use super::risk::assess_risk;
use super::rules::RuleContext;
use super::safety::safety_alerts;
use super::types::{GroupSummary, RiskAssessment, SafetyAlerts, WellnessPlan, PLAN_DISCLAIMER};

/// Compose already computed parts into a plan. Stamps an id and time;
/// computes nothing else.
pub fn assemble(
    patient_id: &str,
    analysis: ModelAnalysis,
    group: GroupSummary,
    risk: RiskAssessment,
    recommendations: RecommendationSet,
    safety: SafetyAlerts,
) -> WellnessPlan {
    WellnessPlan {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        assignment: analysis.assignment,
        group,
        patterns: analysis.patterns,
        risk,
        rules_applied: recommendations.rules_applied,
        nutrition: recommendations.nutrition,
        lifestyle: recommendations.lifestyle,
        supplements: recommendations.supplements,
        safety,
        generated_at: Utc::now(),
        disclaimer: PLAN_DISCLAIMER.to_string(),
    }
}

/// Full plan for one record against a fitted model.
///
/// Either every stage succeeds or an error comes back; there is no
/// partial plan.
pub fn generate_plan(model: &FittedModel, record: &PatientRecord) -> Result<WellnessPlan, AnalysisError> {
    let analysis = model.analyze(record)?;
    let risk = assess_risk(record);

    let recommendations = recommend(RuleContext {
        record,
        assignment: &analysis.assignment,
        risk_tier: risk.tier,
    });
    let safety = safety_alerts(&risk, &recommendations.immediate_actions);

    let group = model
        .profile(analysis.assignment.cluster_id)
        .map(|p| GroupSummary {
            characteristics: p.characteristics.clone(),
            typical_conditions: p.typical_conditions.clone(),
            risk_factors: p.risk_factors.clone(),
        })
        .unwrap_or_default();

    let plan = assemble(&record.patient_id, analysis, group, risk, recommendations, safety);

    tracing::info!(
        plan_id = %plan.id,
        patient_id = %plan.patient_id,
        cluster = %plan.assignment.label,
        risk = %plan.risk.tier,
        rules = plan.rules_applied.len(),
        "Wellness plan generated"
    );

    Ok(plan)
}
