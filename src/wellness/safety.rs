use crate::models::RiskTier;

use super::catalog;
use super::messages::MessageTemplates;
use super::types::{RiskAssessment, SafetyAlerts, SafetyWarning};

/// Turn a risk assessment into patient-facing safety alerts.
///
/// `rule_actions` are immediate actions contributed by the recommendation
/// rules; they follow the crisis actions.
pub fn safety_alerts(risk: &RiskAssessment, rule_actions: &[String]) -> SafetyAlerts {
    let refer = risk.tier.requires_referral();

    let warnings = risk
        .factors
        .iter()
        .map(|factor| SafetyWarning {
            parameter: factor.parameter,
            message: MessageTemplates::risk_factor(factor),
            refer_to_specialist: refer,
        })
        .collect();

    let mut specialist_referrals: Vec<String> = Vec::new();
    for factor in &risk.factors {
        if let Some(specialist) = MessageTemplates::specialist_for(factor) {
            if !specialist_referrals.iter().any(|s| s == specialist) {
                specialist_referrals.push(specialist.to_string());
            }
        }
    }

    let warning_signs: Vec<String> = match risk.tier {
        RiskTier::Critical => catalog::IMMEDIATE_ATTENTION_SIGNS,
        RiskTier::High | RiskTier::Moderate => catalog::URGENT_CONSULTATION_SIGNS,
        RiskTier::Low => &[],
    }
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut immediate_actions: Vec<String> = Vec::new();
    for factor in risk.crisis_factors() {
        let action = MessageTemplates::crisis_action(factor.parameter);
        if !immediate_actions.contains(&action) {
            immediate_actions.push(action);
        }
    }
    for action in rule_actions {
        if !immediate_actions.contains(action) {
            immediate_actions.push(action.clone());
        }
    }

    SafetyAlerts {
        risk_tier: risk.tier,
        warnings,
        specialist_referrals,
        warning_signs,
        immediate_actions,
        follow_up: risk.follow_up,
        follow_up_description: risk.follow_up.description().to_string(),
    }
}
