use crate::analysis::ClusterAssignment;
use crate::models::{ConfidenceTier, PatientRecord, RiskTier};

use super::catalog::{self, SupplementSpec};

/// Inputs every rule predicate may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub record: &'a PatientRecord,
    pub assignment: &'a ClusterAssignment,
    pub risk_tier: RiskTier,
}

impl RuleContext<'_> {
    fn systolic_at_least(&self, threshold: f64) -> bool {
        self.record.vitals.systolic_bp.is_some_and(|v| v >= threshold)
    }

    fn glucose_at_least(&self, threshold: f64) -> bool {
        self.record.labs.fasting_glucose.is_some_and(|v| v >= threshold)
    }

    fn hba1c_at_least(&self, threshold: f64) -> bool {
        self.record.labs.hba1c.is_some_and(|v| v >= threshold)
    }

    fn cholesterol_at_least(&self, threshold: f64) -> bool {
        self.record.labs.total_cholesterol.is_some_and(|v| v >= threshold)
    }

    fn bmi_at_least(&self, threshold: f64) -> bool {
        self.record.vitals.bmi().is_some_and(|v| v >= threshold)
    }

    fn has_condition(&self, needle: &str) -> bool {
        self.record.history.has_condition(needle)
    }

    fn takes(&self, needle: &str) -> bool {
        self.record.history.takes_medication(needle)
    }
}

/// What a rule adds to the plan when it fires. Every field is additive.
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    pub emphasize: &'static [&'static str],
    pub avoid: &'static [&'static str],
    pub meal_tips: &'static [&'static str],
    pub nutrition_notes: &'static [&'static str],
    pub stress: &'static [&'static str],
    pub activity_modifications: &'static [&'static str],
    pub supplements: &'static [SupplementSpec],
    pub contraindications: &'static [&'static str],
    pub interaction_warnings: &'static [&'static str],
    pub monitoring: &'static [&'static str],
    pub immediate_actions: &'static [&'static str],
}

impl Contribution {
    pub const NONE: Self = Self {
        emphasize: &[],
        avoid: &[],
        meal_tips: &[],
        nutrition_notes: &[],
        stress: &[],
        activity_modifications: &[],
        supplements: &[],
        contraindications: &[],
        interaction_warnings: &[],
        monitoring: &[],
        immediate_actions: &[],
    };
}

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RuleContext<'_>) -> bool,
    pub contributes: Contribution,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn always(_: &RuleContext<'_>) -> bool {
    true
}

fn diabetes_risk(ctx: &RuleContext<'_>) -> bool {
    ctx.hba1c_at_least(5.7) || ctx.glucose_at_least(100.0) || ctx.has_condition("diabetes")
}

/// Narrower than `diabetes_risk`: fasting glucose alone does not qualify.
fn diabetes_supplements(ctx: &RuleContext<'_>) -> bool {
    ctx.hba1c_at_least(5.7) || ctx.has_condition("diabetes")
}

fn cardiovascular_risk(ctx: &RuleContext<'_>) -> bool {
    ctx.systolic_at_least(130.0)
        || ctx.cholesterol_at_least(200.0)
        || ctx.has_condition("hypertension")
        || ctx.has_condition("heart")
}

fn hypertension(ctx: &RuleContext<'_>) -> bool {
    ctx.systolic_at_least(130.0)
}

fn weight_management(ctx: &RuleContext<'_>) -> bool {
    ctx.bmi_at_least(25.0)
}

fn heart_condition_activity(ctx: &RuleContext<'_>) -> bool {
    ctx.has_condition("heart") || ctx.systolic_at_least(140.0)
}

fn diagnosed_diabetes(ctx: &RuleContext<'_>) -> bool {
    ctx.has_condition("diabetes")
}

fn severe_obesity(ctx: &RuleContext<'_>) -> bool {
    ctx.bmi_at_least(35.0)
}

fn anticoagulant(ctx: &RuleContext<'_>) -> bool {
    ctx.takes("warfarin") || ctx.takes("blood thinner")
}

fn glucose_lowering(ctx: &RuleContext<'_>) -> bool {
    ctx.takes("metformin") || ctx.takes("diabetes medication")
}

fn elevated_risk(ctx: &RuleContext<'_>) -> bool {
    ctx.risk_tier >= RiskTier::High
}

fn weak_group_match(ctx: &RuleContext<'_>) -> bool {
    ctx.assignment.confidence == ConfidenceTier::Low
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Evaluated in order; output order follows table order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "baseline",
        applies: always,
        contributes: Contribution {
            emphasize: catalog::BASE_EMPHASIZE,
            avoid: catalog::BASE_AVOID,
            stress: catalog::BASE_STRESS,
            supplements: catalog::GENERAL_SUPPLEMENTS,
            ..Contribution::NONE
        },
    },
    Rule {
        name: "diabetes_risk",
        applies: diabetes_risk,
        contributes: Contribution {
            emphasize: catalog::DIABETES_EMPHASIZE,
            avoid: catalog::DIABETES_AVOID,
            meal_tips: catalog::DIABETES_MEAL_TIPS,
            nutrition_notes: &["Monitor blood glucose levels as recommended by healthcare provider"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "diabetes_supplements",
        applies: diabetes_supplements,
        contributes: Contribution {
            supplements: catalog::DIABETES_SUPPLEMENTS,
            monitoring: &["Monitor blood glucose levels when starting new supplements"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "cardiovascular_risk",
        applies: cardiovascular_risk,
        contributes: Contribution {
            emphasize: catalog::CARDIO_EMPHASIZE,
            avoid: catalog::CARDIO_AVOID,
            meal_tips: catalog::CARDIO_MEAL_TIPS,
            supplements: catalog::CARDIO_SUPPLEMENTS,
            monitoring: &["Monitor blood pressure regularly"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "hypertension",
        applies: hypertension,
        contributes: Contribution {
            emphasize: catalog::HYPERTENSION_EMPHASIZE,
            avoid: catalog::HYPERTENSION_AVOID,
            nutrition_notes: &["Monitor blood pressure regularly"],
            stress: &["Practice stress-reduction techniques as stress can elevate blood pressure"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "weight_management",
        applies: weight_management,
        contributes: Contribution {
            meal_tips: catalog::WEIGHT_MEAL_TIPS,
            nutrition_notes: &["Consult a dietitian for personalized meal planning"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "heart_condition_activity",
        applies: heart_condition_activity,
        contributes: Contribution {
            activity_modifications: &[
                "Avoid high-intensity exercise without medical clearance",
                "Monitor heart rate during exercise",
            ],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "diagnosed_diabetes",
        applies: diagnosed_diabetes,
        contributes: Contribution {
            activity_modifications: &[
                "Monitor blood glucose before and after exercise",
                "Carry fast-acting carbohydrates during exercise",
            ],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "severe_obesity",
        applies: severe_obesity,
        contributes: Contribution {
            activity_modifications: &[
                "Start with low-impact activities (swimming, walking)",
                "Gradually increase intensity as fitness improves",
            ],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "anticoagulant_interaction",
        applies: anticoagulant,
        contributes: Contribution {
            contraindications: &["Avoid high-dose omega-3 supplements without medical supervision"],
            interaction_warnings: &[
                "Omega-3 supplements may increase bleeding risk with blood thinners",
            ],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "glucose_lowering_interaction",
        applies: glucose_lowering,
        contributes: Contribution {
            interaction_warnings: &[
                "Monitor blood glucose when adding chromium or cinnamon supplements",
            ],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "elevated_risk_clearance",
        applies: elevated_risk,
        contributes: Contribution {
            activity_modifications: &["Obtain medical clearance before starting a new exercise program"],
            contraindications: &["Start new supplements only after review by your physician"],
            immediate_actions: &["Share this plan with your healthcare provider before making changes"],
            ..Contribution::NONE
        },
    },
    Rule {
        name: "weak_group_match",
        applies: weak_group_match,
        contributes: Contribution {
            nutrition_notes: &[
                "Your profile is not a close match to any patient group; these suggestions rest mainly on your own measurements",
            ],
            ..Contribution::NONE
        },
    },
];

/// Rules whose predicate holds, in table order.
pub fn fired_rules<'a>(ctx: RuleContext<'a>) -> impl Iterator<Item = &'static Rule> + 'a {
    RULES.iter().filter(move |rule| (rule.applies)(&ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, MedicalHistory};

    fn assignment(confidence: ConfidenceTier) -> ClusterAssignment {
        ClusterAssignment {
            cluster_id: 0,
            label: "Healthy Baseline".into(),
            description: String::new(),
            similarity: 0.9,
            confidence,
            distance: 0.1,
        }
    }

    fn names(record: &PatientRecord, tier: RiskTier, confidence: ConfidenceTier) -> Vec<&'static str> {
        let assignment = assignment(confidence);
        let ctx = RuleContext {
            record,
            assignment: &assignment,
            risk_tier: tier,
        };
        fired_rules(ctx).map(|r| r.name).collect()
    }

    #[test]
    fn rule_names_unique() {
        let unique: std::collections::HashSet<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(unique.len(), RULES.len());
        assert_eq!(RULES[0].name, "baseline");
    }

    #[test]
    fn healthy_record_only_gets_baseline() {
        let mut record = PatientRecord::new("p", "P", Some(28), Gender::Male);
        record.vitals.systolic_bp = Some(115.0);
        record.vitals.bmi = Some(22.0);
        record.labs.fasting_glucose = Some(85.0);
        record.labs.hba1c = Some(5.1);

        assert_eq!(
            names(&record, RiskTier::Low, ConfidenceTier::High),
            vec!["baseline"]
        );
    }

    #[test]
    fn prediabetic_triggers_diabetes_rule_only() {
        let mut record = PatientRecord::new("p", "P", Some(45), Gender::Female);
        record.labs.fasting_glucose = Some(110.0);
        record.labs.hba1c = Some(6.0);
        record.vitals.systolic_bp = Some(125.0);

        assert_eq!(
            names(&record, RiskTier::Moderate, ConfidenceTier::High),
            vec!["baseline", "diabetes_risk", "diabetes_supplements"]
        );
    }

    #[test]
    fn raised_glucose_alone_skips_diabetes_supplements() {
        let mut record = PatientRecord::new("p", "P", Some(45), Gender::Female);
        record.labs.fasting_glucose = Some(105.0);
        record.labs.hba1c = Some(5.4);

        assert_eq!(
            names(&record, RiskTier::Low, ConfidenceTier::High),
            vec!["baseline", "diabetes_risk"]
        );
    }

    #[test]
    fn conditions_and_medications_match_case_insensitively() {
        let mut record = PatientRecord::new("p", "P", Some(60), Gender::Male);
        record.history = MedicalHistory::new(
            ["Coronary HEART Disease", "Type 2 Diabetes"],
            ["WARFARIN 5mg", "Metformin 1000mg"],
        );

        let fired = names(&record, RiskTier::Low, ConfidenceTier::High);
        for expected in [
            "diabetes_risk",
            "diabetes_supplements",
            "cardiovascular_risk",
            "heart_condition_activity",
            "diagnosed_diabetes",
            "anticoagulant_interaction",
            "glucose_lowering_interaction",
        ] {
            assert!(fired.contains(&expected), "{expected} did not fire");
        }
        assert!(!fired.contains(&"hypertension"));
    }

    #[test]
    fn tier_and_confidence_rules() {
        let record = PatientRecord::new("p", "P", Some(50), Gender::Other);

        let fired = names(&record, RiskTier::High, ConfidenceTier::Low);
        assert!(fired.contains(&"elevated_risk_clearance"));
        assert!(fired.contains(&"weak_group_match"));

        let fired = names(&record, RiskTier::Moderate, ConfidenceTier::Moderate);
        assert!(!fired.contains(&"elevated_risk_clearance"));
        assert!(!fired.contains(&"weak_group_match"));
    }

    #[test]
    fn bmi_thresholds_are_inclusive() {
        let mut record = PatientRecord::new("p", "P", Some(50), Gender::Female);
        record.vitals.bmi = Some(35.0);
        let fired = names(&record, RiskTier::Moderate, ConfidenceTier::High);
        assert!(fired.contains(&"weight_management"));
        assert!(fired.contains(&"severe_obesity"));
    }
}
