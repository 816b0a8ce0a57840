use crate::models::{PatientRecord, RiskTier};

use super::bands::{reading, BAND_TABLES};
use super::types::{RiskAssessment, RiskFactor};

pub const HIGH_RISK_COUNT: u32 = 4;
pub const MODERATE_RISK_COUNT: u32 = 2;

/// Score raw vitals and labs against the band tables.
///
/// Crisis bands are checked first: any one of them makes the tier
/// critical whatever the weighted count says. The count still includes
/// crisis weights and is always reported. Missing values trigger nothing.
pub fn assess_risk(record: &PatientRecord) -> RiskAssessment {
    let mut crisis = Vec::new();
    let mut weighted = Vec::new();

    for table in BAND_TABLES {
        let Some(value) = reading(record, table.parameter) else {
            continue;
        };
        let Some(band) = table.classify(value) else {
            continue;
        };
        if band.weight == 0 {
            continue;
        }

        let factor = RiskFactor {
            parameter: table.parameter,
            band: band.label.to_string(),
            value,
            threshold: band.lower,
            weight: band.weight,
            crisis: band.crisis,
        };
        if band.crisis {
            crisis.push(factor);
        } else {
            weighted.push(factor);
        }
    }

    let weighted_count: u32 = crisis.iter().chain(&weighted).map(|f| f.weight).sum();

    let tier = if !crisis.is_empty() {
        RiskTier::Critical
    } else if weighted_count >= HIGH_RISK_COUNT {
        RiskTier::High
    } else if weighted_count >= MODERATE_RISK_COUNT {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    };

    let mut factors = crisis;
    factors.extend(weighted);

    RiskAssessment {
        tier,
        factors,
        weighted_count,
        follow_up: tier.follow_up(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClinicalParameter, FollowUpInterval, Gender};
    use crate::wellness::bands::CRISIS_WEIGHT;

    fn record() -> PatientRecord {
        PatientRecord::new("PT-1", "Test", Some(45), Gender::Female)
    }

    #[test]
    fn empty_record_is_low_risk() {
        let assessment = assess_risk(&record());
        assert_eq!(assessment.tier, RiskTier::Low);
        assert!(assessment.factors.is_empty());
        assert_eq!(assessment.weighted_count, 0);
        assert_eq!(assessment.follow_up, FollowUpInterval::Annual);
    }

    #[test]
    fn prediabetic_scenario_is_moderate() {
        let mut r = record();
        r.labs.fasting_glucose = Some(110.0);
        r.labs.hba1c = Some(6.0);
        r.vitals.systolic_bp = Some(125.0);

        let assessment = assess_risk(&r);
        assert_eq!(assessment.tier, RiskTier::Moderate);
        assert_eq!(assessment.weighted_count, 3);
        assert_eq!(assessment.follow_up, FollowUpInterval::WithinTwoMonths);
        assert!(assessment
            .factors
            .iter()
            .any(|f| f.parameter == ClinicalParameter::FastingGlucose && f.band == "prediabetic"));
    }

    #[test]
    fn hypertensive_crisis_short_circuits() {
        let mut r = record();
        r.vitals.systolic_bp = Some(185.0);

        let assessment = assess_risk(&r);
        assert_eq!(assessment.tier, RiskTier::Critical);
        assert_eq!(assessment.follow_up, FollowUpInterval::Immediate);
        assert_eq!(assessment.factors[0].parameter, ClinicalParameter::SystolicBp);
        assert!(assessment.factors[0].crisis);
    }

    #[test]
    fn crisis_wins_even_with_everything_else_normal() {
        let mut r = record();
        r.vitals.systolic_bp = Some(110.0);
        r.vitals.bmi = Some(22.0);
        r.labs.hba1c = Some(5.0);
        r.labs.fasting_glucose = Some(450.0);

        let assessment = assess_risk(&r);
        assert_eq!(assessment.tier, RiskTier::Critical);
        assert_eq!(assessment.crisis_factors().count(), 1);
    }

    #[test]
    fn crisis_factors_listed_before_weighted_ones() {
        let mut r = record();
        r.vitals.bmi = Some(36.0);
        r.vitals.diastolic_bp = Some(125.0);

        let assessment = assess_risk(&r);
        assert!(assessment.factors[0].crisis);
        assert_eq!(assessment.factors[0].parameter, ClinicalParameter::DiastolicBp);
        assert_eq!(assessment.factors[1].parameter, ClinicalParameter::Bmi);
        assert_eq!(assessment.weighted_count, CRISIS_WEIGHT + 2);
    }

    #[test]
    fn heavy_weighted_count_is_high() {
        let mut r = record();
        r.vitals.systolic_bp = Some(150.0);
        r.labs.fasting_glucose = Some(140.0);

        let assessment = assess_risk(&r);
        assert_eq!(assessment.weighted_count, 4);
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.follow_up, FollowUpInterval::WithinTwoWeeks);
    }

    #[test]
    fn systolic_monotonic_in_count() {
        let mut previous = 0;
        let mut previous_tier = RiskTier::Low;
        for systolic in (90..=220).step_by(5) {
            let mut r = record();
            r.vitals.systolic_bp = Some(systolic as f64);
            r.labs.fasting_glucose = Some(105.0);
            let assessment = assess_risk(&r);

            assert!(
                assessment.weighted_count >= previous,
                "count dropped at systolic {systolic}"
            );
            assert!(assessment.tier >= previous_tier);
            previous = assessment.weighted_count;
            previous_tier = assessment.tier;
        }
    }

    #[test]
    fn threshold_is_band_lower_bound() {
        let mut r = record();
        r.labs.ldl_cholesterol = Some(172.0);
        let assessment = assess_risk(&r);
        assert_eq!(assessment.factors[0].threshold, 160.0);
        assert_eq!(assessment.factors[0].value, 172.0);
        assert_eq!(assessment.tier, RiskTier::Low);
    }
}
