//! Built-in demonstration records. Used by the CLI when no database is
//! configured, and by tests as a small but varied training population.

use crate::models::{Gender, LabResults, MedicalHistory, PatientRecord, VitalSigns};

struct Sample {
    id: &'static str,
    name: &'static str,
    age: u32,
    gender: Gender,
    /// systolic, diastolic, heart rate, weight kg, height cm
    vitals: [f64; 5],
    /// glucose, HbA1c, total cholesterol, LDL, HDL, triglycerides
    labs: [f64; 6],
    creatinine: Option<f64>,
    conditions: &'static [&'static str],
    medications: &'static [&'static str],
    allergies: &'static [&'static str],
    family: &'static [&'static str],
    symptoms: &'static [&'static str],
}

impl Sample {
    fn build(&self) -> PatientRecord {
        let [systolic, diastolic, heart_rate, weight, height] = self.vitals;
        let [glucose, hba1c, total, ldl, hdl, triglycerides] = self.labs;

        let mut record = PatientRecord::new(self.id, self.name, Some(self.age), self.gender);
        record.vitals = VitalSigns {
            systolic_bp: Some(systolic),
            diastolic_bp: Some(diastolic),
            heart_rate: Some(heart_rate),
            bmi: None,
            weight_kg: Some(weight),
            height_cm: Some(height),
        };
        record.labs = LabResults {
            fasting_glucose: Some(glucose),
            hba1c: Some(hba1c),
            total_cholesterol: Some(total),
            ldl_cholesterol: Some(ldl),
            hdl_cholesterol: Some(hdl),
            triglycerides: Some(triglycerides),
            creatinine: self.creatinine,
            bun: None,
        };
        record.history = MedicalHistory::new(
            self.conditions.iter().copied(),
            self.medications.iter().copied(),
        )
        .with_allergies(self.allergies.iter().copied())
        .with_family_history(self.family);
        record.symptoms = self.symptoms.iter().map(|s| s.to_string()).collect();
        record
    }
}

const POPULATION: &[Sample] = &[
    Sample {
        id: "PT-2024-0001",
        name: "Alex Johnson",
        age: 28,
        gender: Gender::Male,
        vitals: [118.0, 75.0, 68.0, 75.0, 180.0],
        labs: [88.0, 5.2, 180.0, 110.0, 55.0, 95.0],
        creatinine: None,
        conditions: &[],
        medications: &[],
        allergies: &["Penicillin"],
        family: &["Hypertension (father)"],
        symptoms: &[],
    },
    Sample {
        id: "PT-2024-0002",
        name: "Priya Sharma",
        age: 52,
        gender: Gender::Female,
        vitals: [142.0, 88.0, 78.0, 82.0, 165.0],
        labs: [118.0, 6.1, 245.0, 165.0, 38.0, 220.0],
        creatinine: None,
        conditions: &["Pre-diabetes", "Stage 1 Hypertension"],
        medications: &["Telmisartan 40mg", "Metformin 500mg"],
        allergies: &[],
        family: &["Type 2 Diabetes (both parents)", "Heart disease (father)"],
        symptoms: &["Fatigue", "Occasional headaches", "Frequent urination"],
    },
    Sample {
        id: "PT-2024-0003",
        name: "Rajesh Kumar",
        age: 64,
        gender: Gender::Male,
        vitals: [155.0, 95.0, 82.0, 95.0, 175.0],
        labs: [165.0, 8.2, 280.0, 190.0, 32.0, 350.0],
        creatinine: Some(1.4),
        conditions: &["Type 2 Diabetes", "Hypertension", "Diabetic nephropathy"],
        medications: &[
            "Metformin 1000mg",
            "Glimepiride 2mg",
            "Amlodipine 5mg",
            "Atorvastatin 20mg",
        ],
        allergies: &["Sulfa drugs"],
        family: &["Type 2 Diabetes (mother)", "Stroke (father)"],
        symptoms: &[
            "Frequent urination",
            "Blurred vision",
            "Foot numbness",
            "Excessive thirst",
        ],
    },
    Sample {
        id: "PT-2024-0004",
        name: "Maria Rodriguez",
        age: 35,
        gender: Gender::Female,
        vitals: [135.0, 85.0, 75.0, 88.0, 160.0],
        labs: [105.0, 5.9, 220.0, 145.0, 35.0, 180.0],
        creatinine: None,
        conditions: &["Metabolic syndrome", "PCOS"],
        medications: &["Metformin 500mg"],
        allergies: &[],
        family: &["Type 2 Diabetes (grandmother)", "Obesity (mother)"],
        symptoms: &["Weight gain", "Irregular periods", "Fatigue"],
    },
    Sample {
        id: "PT-2024-0005",
        name: "Eleanor Thompson",
        age: 78,
        gender: Gender::Female,
        vitals: [160.0, 90.0, 68.0, 68.0, 158.0],
        labs: [140.0, 7.1, 200.0, 120.0, 45.0, 150.0],
        creatinine: Some(1.2),
        conditions: &[
            "Type 2 Diabetes",
            "Hypertension",
            "Osteoporosis",
            "Mild cognitive impairment",
        ],
        medications: &[
            "Insulin glargine",
            "Amlodipine 5mg",
            "Alendronate 70mg",
            "Vitamin D3",
        ],
        allergies: &["Aspirin"],
        family: &["Alzheimer's disease (mother)", "Heart disease (father)"],
        symptoms: &["Memory issues", "Joint pain", "Dizziness"],
    },
    Sample {
        id: "PT-2024-0006",
        name: "David Kim",
        age: 24,
        gender: Gender::Male,
        vitals: [110.0, 70.0, 55.0, 70.0, 178.0],
        labs: [82.0, 4.8, 160.0, 95.0, 65.0, 75.0],
        creatinine: None,
        conditions: &[],
        medications: &[],
        allergies: &[],
        family: &["Hypertension (grandfather)"],
        symptoms: &[],
    },
    Sample {
        id: "PT-2024-0007",
        name: "Jennifer Wilson",
        age: 48,
        gender: Gender::Female,
        vitals: [148.0, 92.0, 80.0, 78.0, 168.0],
        labs: [95.0, 5.4, 260.0, 175.0, 42.0, 195.0],
        creatinine: None,
        conditions: &["Hypertension", "Hyperlipidemia"],
        medications: &["Losartan 50mg", "Simvastatin 20mg"],
        allergies: &[],
        family: &["Heart attack (father at 55)", "Stroke (mother at 68)"],
        symptoms: &["Chest tightness with exertion", "Shortness of breath"],
    },
    Sample {
        id: "PT-2024-0008",
        name: "Michael Brown",
        age: 32,
        gender: Gender::Male,
        vitals: [125.0, 80.0, 72.0, 85.0, 183.0],
        labs: [98.0, 5.5, 195.0, 125.0, 48.0, 110.0],
        creatinine: None,
        conditions: &[],
        medications: &[],
        allergies: &["Shellfish"],
        family: &[
            "Type 2 Diabetes (father, uncle)",
            "Heart disease (grandfather)",
        ],
        symptoms: &[],
    },
];

/// Eight varied patients, ids PT-2024-0001 to PT-2024-0008.
pub fn sample_population() -> Vec<PatientRecord> {
    POPULATION.iter().map(Sample::build).collect()
}

/// Record used for demonstrations. Same clinical profile as
/// PT-2024-0002 under a separate id.
pub fn demo_patient() -> PatientRecord {
    let mut record = POPULATION[1].build();
    record.patient_id = "PT-2024-7891".into();
    record
}
