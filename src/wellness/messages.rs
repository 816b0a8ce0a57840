use crate::models::ClinicalParameter;

use super::types::RiskFactor;

/// Message template builder for safety wording.
/// Plain, non-alarming language; every message names the value it is about.
pub struct MessageTemplates;

impl MessageTemplates {
    /// One warning per triggered factor.
    pub fn risk_factor(factor: &RiskFactor) -> String {
        let parameter = factor.parameter;
        if factor.crisis {
            return format!(
                "{} of {} {} is at a crisis level (at or above {} {}). This needs prompt medical attention.",
                parameter.label(),
                format_value(factor.value),
                parameter.unit(),
                format_value(factor.threshold),
                parameter.unit(),
            );
        }
        format!(
            "{} of {} {} falls in the {} range (from {} {}).",
            parameter.label(),
            format_value(factor.value),
            parameter.unit(),
            factor.band.replace('_', " "),
            format_value(factor.threshold),
            parameter.unit(),
        )
    }

    /// Immediate action for a crisis-level factor.
    pub fn crisis_action(parameter: ClinicalParameter) -> String {
        let condition = match parameter {
            ClinicalParameter::SystolicBp | ClinicalParameter::DiastolicBp => {
                "blood pressure crisis"
            }
            ClinicalParameter::FastingGlucose => "severe hyperglycemia",
            other => other.label(),
        };
        format!("Seek immediate medical attention for {condition}")
    }

    /// Specialist suggested by a factor, if any. Only the heavier bands
    /// point to a specialist.
    pub fn specialist_for(factor: &RiskFactor) -> Option<&'static str> {
        if factor.weight < 2 {
            return None;
        }
        match factor.parameter {
            ClinicalParameter::SystolicBp | ClinicalParameter::DiastolicBp => {
                Some("Cardiologist for hypertension management")
            }
            ClinicalParameter::FastingGlucose | ClinicalParameter::Hba1c => {
                Some("Endocrinologist for diabetes management")
            }
            ClinicalParameter::Bmi => Some("Registered dietitian for weight management"),
            ClinicalParameter::LdlCholesterol => Some("Cardiologist for cholesterol management"),
            ClinicalParameter::TotalCholesterol => None,
        }
    }
}

/// Whole numbers print without decimals, others with one.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
