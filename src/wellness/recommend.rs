use crate::models::{FitnessLevel, PatientRecord};

use super::catalog::{self, SupplementSpec};
use super::rules::{fired_rules, RuleContext};
use super::types::{
    LifestyleRecommendation, NutritionRecommendation, Supplement, SupplementRecommendation,
    SUPPLEMENT_ADVISORY,
};

/// Merged output of every rule that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSet {
    pub rules_applied: Vec<String>,
    pub nutrition: NutritionRecommendation,
    pub lifestyle: LifestyleRecommendation,
    pub supplements: SupplementRecommendation,
    /// Actions contributed by rules, merged into the safety alerts later.
    pub immediate_actions: Vec<String>,
}

/// Append values not already present. First occurrence keeps its place.
fn extend_unique(target: &mut Vec<String>, values: &[&str]) {
    for value in values {
        if !target.iter().any(|existing| existing == value) {
            target.push((*value).to_string());
        }
    }
}

fn extend_supplements(target: &mut Vec<Supplement>, specs: &[SupplementSpec]) {
    for spec in specs {
        if target.iter().any(|s| s.name == spec.name) {
            continue;
        }
        target.push(Supplement {
            name: spec.name.to_string(),
            dosage: spec.dosage.to_string(),
            timing: spec.timing.to_string(),
            advisory: SUPPLEMENT_ADVISORY.to_string(),
        });
    }
}

/// Advanced needs age under 30, no conditions and BMI under 25;
/// intermediate relaxes that to under 40 and under 30. An unknown age
/// always means beginner. An unknown BMI does not hold anyone back.
pub fn fitness_level(record: &PatientRecord) -> FitnessLevel {
    let Some(age) = record.age else {
        return FitnessLevel::Beginner;
    };
    if !record.history.conditions.is_empty() {
        return FitnessLevel::Beginner;
    }
    let bmi_below = |limit: f64| record.vitals.bmi().map_or(true, |b| b < limit);

    if age < 30 && bmi_below(25.0) {
        FitnessLevel::Advanced
    } else if age < 40 && bmi_below(30.0) {
        FitnessLevel::Intermediate
    } else {
        FitnessLevel::Beginner
    }
}

/// Evaluate the rule table and union the contributions.
pub fn recommend(ctx: RuleContext<'_>) -> RecommendationSet {
    let mut rules_applied = Vec::new();
    let mut nutrition = NutritionRecommendation {
        hydration: catalog::HYDRATION.to_string(),
        ..Default::default()
    };
    let mut stress = Vec::new();
    let mut activity_modifications = Vec::new();
    let mut supplements = SupplementRecommendation::default();
    let mut immediate_actions = Vec::new();

    for rule in fired_rules(ctx) {
        let c = &rule.contributes;
        rules_applied.push(rule.name.to_string());

        extend_unique(&mut nutrition.foods_to_emphasize, c.emphasize);
        extend_unique(&mut nutrition.foods_to_avoid, c.avoid);
        extend_unique(&mut nutrition.meal_planning_tips, c.meal_tips);
        extend_unique(&mut nutrition.special_considerations, c.nutrition_notes);
        extend_unique(&mut stress, c.stress);
        extend_unique(&mut activity_modifications, c.activity_modifications);
        extend_supplements(&mut supplements.supplements, c.supplements);
        extend_unique(&mut supplements.contraindications, c.contraindications);
        extend_unique(&mut supplements.interaction_warnings, c.interaction_warnings);
        extend_unique(&mut supplements.monitoring, c.monitoring);
        extend_unique(&mut immediate_actions, c.immediate_actions);
    }

    let level = fitness_level(ctx.record);
    let guideline = catalog::exercise_guideline(level);
    let lifestyle = LifestyleRecommendation {
        fitness_level: level,
        aerobic: guideline.aerobic.to_string(),
        strength: guideline.strength.to_string(),
        flexibility: guideline.flexibility.to_string(),
        frequency: catalog::EXERCISE_FREQUENCY.to_string(),
        duration: catalog::EXERCISE_DURATION.to_string(),
        sleep: catalog::SLEEP.iter().map(|s| s.to_string()).collect(),
        stress_management: stress,
        activity_modifications,
    };

    RecommendationSet {
        rules_applied,
        nutrition,
        lifestyle,
        supplements,
        immediate_actions,
    }
}
