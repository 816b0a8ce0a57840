use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::PatientRecord;

/// Share of members a condition must exceed to count as typical.
const TYPICAL_CONDITION_SHARE: f64 = 0.3;

/// Training-time summary of one cluster's members, in raw units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster_id: usize,
    pub label: String,
    pub description: String,
    pub size: usize,
    pub characteristics: Vec<String>,
    pub typical_conditions: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Mean of each raw measurement over members that have it.
#[derive(Debug, Default, Clone, Copy)]
struct MemberAverages {
    age: Option<f64>,
    bmi: Option<f64>,
    systolic: Option<f64>,
    diastolic: Option<f64>,
    glucose: Option<f64>,
    hba1c: Option<f64>,
    cholesterol: Option<f64>,
    triglycerides: Option<f64>,
    conditions: f64,
}

impl MemberAverages {
    fn of(members: &[&PatientRecord]) -> Self {
        fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
            let present: Vec<f64> = values.flatten().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        }

        let conditions = if members.is_empty() {
            0.0
        } else {
            members
                .iter()
                .map(|m| m.history.conditions.len() as f64)
                .sum::<f64>()
                / members.len() as f64
        };

        Self {
            age: mean(members.iter().map(|m| m.age.map(f64::from))),
            bmi: mean(members.iter().map(|m| m.vitals.bmi())),
            systolic: mean(members.iter().map(|m| m.vitals.systolic_bp)),
            diastolic: mean(members.iter().map(|m| m.vitals.diastolic_bp)),
            glucose: mean(members.iter().map(|m| m.labs.fasting_glucose)),
            hba1c: mean(members.iter().map(|m| m.labs.hba1c)),
            cholesterol: mean(members.iter().map(|m| m.labs.total_cholesterol)),
            triglycerides: mean(members.iter().map(|m| m.labs.triglycerides)),
            conditions,
        }
    }
}

fn at_least(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v >= threshold)
}

/// First matching rule wins.
fn label_for(avg: &MemberAverages) -> &'static str {
    if avg.conditions >= 3.0 {
        "Complex Comorbidities"
    } else if at_least(avg.glucose, 126.0) || at_least(avg.hba1c, 6.5) {
        "Diabetes Management"
    } else if at_least(avg.bmi, 30.0)
        || (at_least(avg.glucose, 100.0)
            && (at_least(avg.triglycerides, 150.0) || at_least(avg.bmi, 25.0)))
    {
        "Metabolic Syndrome"
    } else if at_least(avg.systolic, 130.0) || at_least(avg.cholesterol, 240.0) {
        "Cardiovascular Risk"
    } else {
        "Healthy Baseline"
    }
}

fn characteristics_of(avg: &MemberAverages) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(age) = avg.age {
        out.push(format!("Average age: {age:.1} years"));
    }
    if let Some(bmi) = avg.bmi {
        out.push(format!("Average BMI: {bmi:.1}"));
    }
    match (avg.systolic, avg.diastolic) {
        (Some(s), Some(d)) => out.push(format!("Average blood pressure: {s:.0}/{d:.0} mmHg")),
        (Some(s), None) => out.push(format!("Average systolic pressure: {s:.0} mmHg")),
        _ => {}
    }
    if let Some(g) = avg.glucose {
        out.push(format!("Average fasting glucose: {g:.0} mg/dL"));
    }
    if let Some(h) = avg.hba1c {
        out.push(format!("Average HbA1c: {h:.1}%"));
    }
    if let Some(c) = avg.cholesterol {
        out.push(format!("Average total cholesterol: {c:.0} mg/dL"));
    }
    out
}

fn risk_factors_of(avg: &MemberAverages) -> Vec<String> {
    let mut out = Vec::new();
    if at_least(avg.bmi, 30.0) {
        out.push("Obesity".to_string());
    } else if at_least(avg.bmi, 25.0) {
        out.push("Overweight".to_string());
    }
    if at_least(avg.systolic, 140.0) {
        out.push("Hypertension".to_string());
    } else if at_least(avg.systolic, 130.0) {
        out.push("Elevated blood pressure".to_string());
    }
    if at_least(avg.glucose, 126.0) {
        out.push("Type 2 Diabetes".to_string());
    } else if at_least(avg.glucose, 100.0) {
        out.push("Pre-diabetes".to_string());
    }
    if at_least(avg.cholesterol, 240.0) {
        out.push("High cholesterol".to_string());
    }
    out
}

fn typical_conditions_of(members: &[&PatientRecord]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in members {
        for condition in &member.history.conditions {
            *counts.entry(condition.as_str()).or_default() += 1;
        }
    }

    let threshold = members.len() as f64 * TYPICAL_CONDITION_SHARE;
    let mut typical: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count as f64 > threshold)
        .collect();
    typical.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    typical.into_iter().map(|(c, _)| c.to_string()).collect()
}

/// Summarize every cluster from its raw training members. Labels repeated
/// across clusters get a numeric suffix so each one stays distinct.
pub fn build_profiles(records: &[PatientRecord], labels: &[usize], k: usize) -> Vec<ClusterProfile> {
    let mut seen: BTreeMap<&'static str, usize> = BTreeMap::new();

    (0..k)
        .map(|cluster_id| {
            let members: Vec<&PatientRecord> = records
                .iter()
                .zip(labels)
                .filter(|&(_, &l)| l == cluster_id)
                .map(|(r, _)| r)
                .collect();

            let avg = MemberAverages::of(&members);
            let base = label_for(&avg);
            let occurrence = seen.entry(base).or_default();
            *occurrence += 1;
            let label = if *occurrence == 1 {
                base.to_string()
            } else {
                format!("{base} {occurrence}")
            };

            let characteristics = characteristics_of(&avg);
            let description = if characteristics.is_empty() {
                format!("{label} group of {} patients", members.len())
            } else {
                format!(
                    "{label} group of {} patients. {}",
                    members.len(),
                    characteristics.join("; ")
                )
            };

            ClusterProfile {
                cluster_id,
                label,
                description,
                size: members.len(),
                characteristics,
                typical_conditions: typical_conditions_of(&members),
                risk_factors: risk_factors_of(&avg),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, MedicalHistory};

    fn member(id: &str, systolic: f64, glucose: f64, bmi: f64, conditions: &[&str]) -> PatientRecord {
        let mut r = PatientRecord::new(id, id, Some(50), Gender::Male);
        r.vitals.systolic_bp = Some(systolic);
        r.vitals.diastolic_bp = Some(80.0);
        r.vitals.bmi = Some(bmi);
        r.labs.fasting_glucose = Some(glucose);
        r.labs.hba1c = Some(5.4);
        r.labs.total_cholesterol = Some(190.0);
        r.labs.triglycerides = Some(120.0);
        r.history = MedicalHistory::new(conditions.iter().copied(), Vec::<String>::new());
        r
    }

    #[test]
    fn labels_follow_rule_order() {
        let records = vec![
            member("healthy", 115.0, 88.0, 22.0, &[]),
            member("cardio", 145.0, 92.0, 24.0, &["Hypertension"]),
            member("diabetic", 128.0, 160.0, 28.0, &["Type 2 Diabetes"]),
            member("metabolic", 125.0, 110.0, 31.0, &[]),
            member("complex", 150.0, 140.0, 33.0, &["A", "B", "C"]),
        ];
        let profiles = build_profiles(&records, &[0, 1, 2, 3, 4], 5);

        let labels: Vec<&str> = profiles.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Healthy Baseline",
                "Cardiovascular Risk",
                "Diabetes Management",
                "Metabolic Syndrome",
                "Complex Comorbidities",
            ]
        );
    }

    #[test]
    fn duplicate_labels_get_suffix() {
        let records = vec![
            member("a", 110.0, 85.0, 21.0, &[]),
            member("b", 112.0, 86.0, 22.0, &[]),
        ];
        let profiles = build_profiles(&records, &[0, 1], 2);
        assert_eq!(profiles[0].label, "Healthy Baseline");
        assert_eq!(profiles[1].label, "Healthy Baseline 2");
    }

    #[test]
    fn typical_conditions_need_more_than_thirty_percent() {
        let records = vec![
            member("a", 135.0, 90.0, 24.0, &["Hypertension"]),
            member("b", 138.0, 90.0, 24.0, &["Hypertension", "Asthma"]),
            member("c", 132.0, 90.0, 24.0, &[]),
            member("d", 131.0, 90.0, 24.0, &[]),
        ];
        let profiles = build_profiles(&records, &[0, 0, 0, 0], 1);
        assert_eq!(profiles[0].typical_conditions, vec!["Hypertension"]);
        assert_eq!(profiles[0].size, 4);
    }

    #[test]
    fn risk_factors_and_characteristics_from_averages() {
        let records = vec![
            member("a", 142.0, 128.0, 31.0, &[]),
            member("b", 146.0, 130.0, 32.0, &[]),
        ];
        let profile = &build_profiles(&records, &[0, 0], 1)[0];
        assert_eq!(
            profile.risk_factors,
            vec!["Obesity", "Hypertension", "Type 2 Diabetes"]
        );
        assert!(profile
            .characteristics
            .contains(&"Average blood pressure: 144/80 mmHg".to_string()));
        assert!(profile.description.starts_with("Diabetes Management group of 2 patients"));
    }
}
