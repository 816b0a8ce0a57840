use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

// Declaration order is severity order.
str_enum!(RiskTier {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Critical => "critical",
});

str_enum!(ConfidenceTier {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

str_enum!(FitnessLevel {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

str_enum!(FollowUpInterval {
    Immediate => "immediate",
    WithinTwoWeeks => "within_two_weeks",
    WithinTwoMonths => "within_two_months",
    Annual => "annual",
});

str_enum!(ClinicalParameter {
    SystolicBp => "systolic_bp",
    DiastolicBp => "diastolic_bp",
    FastingGlucose => "fasting_glucose",
    Hba1c => "hba1c",
    Bmi => "bmi",
    TotalCholesterol => "total_cholesterol",
    LdlCholesterol => "ldl_cholesterol",
});

impl Gender {
    /// Lenient parse for free-text input: anything that is not male or
    /// female (case-insensitive) is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Other,
        }
    }
}

impl RiskTier {
    /// Follow-up interval mandated by this tier.
    pub fn follow_up(&self) -> FollowUpInterval {
        match self {
            Self::Critical => FollowUpInterval::Immediate,
            Self::High => FollowUpInterval::WithinTwoWeeks,
            Self::Moderate => FollowUpInterval::WithinTwoMonths,
            Self::Low => FollowUpInterval::Annual,
        }
    }

    /// Tiers at which every safety warning carries a specialist referral.
    pub fn requires_referral(&self) -> bool {
        *self >= Self::High
    }
}

impl ConfidenceTier {
    pub const HIGH_THRESHOLD: f64 = 0.7;
    pub const MODERATE_THRESHOLD: f64 = 0.4;

    /// Threshold a similarity score. Boundaries are inclusive: 0.7 is high.
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= Self::HIGH_THRESHOLD {
            Self::High
        } else if similarity >= Self::MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl ClinicalParameter {
    /// Reader-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystolicBp => "Systolic blood pressure",
            Self::DiastolicBp => "Diastolic blood pressure",
            Self::FastingGlucose => "Fasting glucose",
            Self::Hba1c => "HbA1c",
            Self::Bmi => "BMI",
            Self::TotalCholesterol => "Total cholesterol",
            Self::LdlCholesterol => "LDL cholesterol",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::SystolicBp | Self::DiastolicBp => "mmHg",
            Self::FastingGlucose | Self::TotalCholesterol | Self::LdlCholesterol => "mg/dL",
            Self::Hba1c => "%",
            Self::Bmi => "kg/m²",
        }
    }
}

impl FollowUpInterval {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Immediate => "Seek medical attention immediately",
            Self::WithinTwoWeeks => "Schedule a follow-up within 1-2 weeks",
            Self::WithinTwoMonths => "Schedule a follow-up within 1-2 months",
            Self::Annual => "Annual routine check-up",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for (variant, s) in [
            (Gender::Male, "male"),
            (Gender::Female, "female"),
            (Gender::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn gender_from_label_is_lenient() {
        assert_eq!(Gender::from_label("MALE"), Gender::Male);
        assert_eq!(Gender::from_label(" Female "), Gender::Female);
        assert_eq!(Gender::from_label("non-binary"), Gender::Other);
        assert_eq!(Gender::from_label(""), Gender::Other);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let err = RiskTier::from_str("severe").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Moderate);
        assert!(RiskTier::Moderate < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn follow_up_mapping() {
        assert_eq!(RiskTier::Critical.follow_up(), FollowUpInterval::Immediate);
        assert_eq!(RiskTier::High.follow_up(), FollowUpInterval::WithinTwoWeeks);
        assert_eq!(RiskTier::Moderate.follow_up(), FollowUpInterval::WithinTwoMonths);
        assert_eq!(RiskTier::Low.follow_up(), FollowUpInterval::Annual);
    }

    #[test]
    fn referral_only_for_high_and_critical() {
        assert!(!RiskTier::Low.requires_referral());
        assert!(!RiskTier::Moderate.requires_referral());
        assert!(RiskTier::High.requires_referral());
        assert!(RiskTier::Critical.requires_referral());
    }

    #[test]
    fn confidence_boundaries_are_exact() {
        assert_eq!(ConfidenceTier::from_similarity(0.7), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_similarity(0.6999), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_similarity(0.4), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_similarity(0.3999), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_similarity(0.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_similarity(1.0), ConfidenceTier::High);
    }

    #[test]
    fn clinical_parameter_labels_and_units() {
        assert_eq!(ClinicalParameter::Hba1c.as_str(), "hba1c");
        assert_eq!(ClinicalParameter::SystolicBp.unit(), "mmHg");
        assert_eq!(
            ClinicalParameter::from_str("ldl_cholesterol").unwrap(),
            ClinicalParameter::LdlCholesterol
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&FollowUpInterval::WithinTwoWeeks).unwrap();
        assert_eq!(json, "\"within_two_weeks\"");
    }
}
