use crate::models::{ClinicalParameter, PatientRecord};

/// Crisis bands outweigh every scored band so the count stays monotonic.
pub const CRISIS_WEIGHT: u32 = 3;

/// Closed-open interval `[lower, upper)` with its scoring weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub weight: u32,
    /// Any value in a crisis band makes the whole assessment critical.
    pub crisis: bool,
}

impl Band {
    const fn scored(label: &'static str, lower: f64, upper: f64, weight: u32) -> Self {
        Self {
            label,
            lower,
            upper,
            weight,
            crisis: false,
        }
    }

    const fn crisis(label: &'static str, lower: f64) -> Self {
        Self {
            label,
            lower,
            upper: f64::INFINITY,
            weight: CRISIS_WEIGHT,
            crisis: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value < self.upper
    }
}

/// Ordered, contiguous bands for one parameter.
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub parameter: ClinicalParameter,
    pub bands: &'static [Band],
}

impl BandTable {
    pub fn classify(&self, value: f64) -> Option<&'static Band> {
        self.bands.iter().find(|b| b.contains(value))
    }
}

const INF: f64 = f64::INFINITY;

const SYSTOLIC: &[Band] = &[
    Band::scored("normal", 0.0, 120.0, 0),
    Band::scored("elevated", 120.0, 130.0, 1),
    Band::scored("stage1", 130.0, 140.0, 1),
    Band::scored("stage2", 140.0, 180.0, 2),
    Band::crisis("crisis", 180.0),
];

const DIASTOLIC: &[Band] = &[
    Band::scored("normal", 0.0, 80.0, 0),
    Band::scored("stage1", 80.0, 90.0, 1),
    Band::scored("stage2", 90.0, 120.0, 2),
    Band::crisis("crisis", 120.0),
];

const FASTING_GLUCOSE: &[Band] = &[
    Band::scored("normal", 0.0, 100.0, 0),
    Band::scored("prediabetic", 100.0, 126.0, 1),
    Band::scored("diabetic", 126.0, 400.0, 2),
    Band::crisis("crisis", 400.0),
];

const HBA1C: &[Band] = &[
    Band::scored("normal", 0.0, 5.7, 0),
    Band::scored("prediabetic", 5.7, 6.5, 1),
    Band::scored("diabetic", 6.5, INF, 2),
];

const BMI: &[Band] = &[
    Band::scored("underweight", 0.0, 18.5, 0),
    Band::scored("normal", 18.5, 25.0, 0),
    Band::scored("overweight", 25.0, 30.0, 0),
    Band::scored("obese", 30.0, 35.0, 1),
    Band::scored("severe_obesity", 35.0, INF, 2),
];

const TOTAL_CHOLESTEROL: &[Band] = &[
    Band::scored("desirable", 0.0, 200.0, 0),
    Band::scored("borderline", 200.0, 240.0, 0),
    Band::scored("high", 240.0, INF, 1),
];

const LDL_CHOLESTEROL: &[Band] = &[
    Band::scored("optimal", 0.0, 100.0, 0),
    Band::scored("near_optimal", 100.0, 130.0, 0),
    Band::scored("borderline", 130.0, 160.0, 0),
    Band::scored("high", 160.0, 190.0, 1),
    Band::scored("very_high", 190.0, INF, 2),
];

/// Every scored parameter, in reporting order.
pub const BAND_TABLES: &[BandTable] = &[
    BandTable {
        parameter: ClinicalParameter::SystolicBp,
        bands: SYSTOLIC,
    },
    BandTable {
        parameter: ClinicalParameter::DiastolicBp,
        bands: DIASTOLIC,
    },
    BandTable {
        parameter: ClinicalParameter::FastingGlucose,
        bands: FASTING_GLUCOSE,
    },
    BandTable {
        parameter: ClinicalParameter::Hba1c,
        bands: HBA1C,
    },
    BandTable {
        parameter: ClinicalParameter::Bmi,
        bands: BMI,
    },
    BandTable {
        parameter: ClinicalParameter::TotalCholesterol,
        bands: TOTAL_CHOLESTEROL,
    },
    BandTable {
        parameter: ClinicalParameter::LdlCholesterol,
        bands: LDL_CHOLESTEROL,
    },
];

/// Raw value of a parameter, if recorded and finite.
pub fn reading(record: &PatientRecord, parameter: ClinicalParameter) -> Option<f64> {
    let value = match parameter {
        ClinicalParameter::SystolicBp => record.vitals.systolic_bp,
        ClinicalParameter::DiastolicBp => record.vitals.diastolic_bp,
        ClinicalParameter::FastingGlucose => record.labs.fasting_glucose,
        ClinicalParameter::Hba1c => record.labs.hba1c,
        ClinicalParameter::Bmi => record.vitals.bmi(),
        ClinicalParameter::TotalCholesterol => record.labs.total_cholesterol,
        ClinicalParameter::LdlCholesterol => record.labs.ldl_cholesterol,
    };
    value.filter(|v| v.is_finite())
}
