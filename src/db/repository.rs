use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::sqlite::{open_database, open_memory_database};
use super::{DatabaseError, PatientStore};
use crate::models::{Gender, LabResults, MedicalHistory, PatientRecord, VitalSigns};

const PATIENT_COLUMNS: &str = "patient_id, name, age, gender,
     systolic_bp, diastolic_bp, heart_rate, bmi, weight_kg, height_cm,
     fasting_glucose, hba1c, total_cholesterol, ldl_cholesterol, hdl_cholesterol,
     triglycerides, creatinine, bun,
     conditions, medications, allergies, family_diabetes, family_heart_disease,
     symptoms, created_at";

/// Patient store backed by a single SQLite connection.
pub struct SqlitePatientStore {
    conn: Mutex<Connection>,
}

impl SqlitePatientStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    /// Wrap a connection that already has migrations applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn query(&self, sql: &str, param: Option<&str>) -> Result<Vec<PatientRecord>, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockFailed)?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match param {
            Some(p) => stmt
                .query_map(params![p], PatientRow::read)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], PatientRow::read)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        rows.into_iter().map(patient_from_row).collect()
    }
}

impl PatientStore for SqlitePatientStore {
    fn find_by_id(&self, id: &str) -> Result<PatientRecord, DatabaseError> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?1");
        self.query(&sql, Some(id))?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::patient_not_found(id))
    }

    fn find_by_name(&self, query: &str) -> Result<Vec<PatientRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients
             WHERE instr(name_lower, ?1) > 0
             ORDER BY name, patient_id"
        );
        self.query(&sql, Some(&query.to_lowercase()))
    }

    fn list_all(&self) -> Result<Vec<PatientRecord>, DatabaseError> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY patient_id");
        self.query(&sql, None)
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), DatabaseError> {
        let conditions = serde_json::to_string(&record.history.conditions)?;
        let medications = serde_json::to_string(&record.history.medications)?;
        let allergies = serde_json::to_string(&record.history.allergies)?;
        let symptoms = serde_json::to_string(&record.symptoms)?;

        let conn = self.conn.lock().map_err(|_| DatabaseError::LockFailed)?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO patients ({PATIENT_COLUMNS}, name_lower)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                         ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)"
            ),
            params![
                record.patient_id,
                record.name,
                record.age,
                record.gender.as_str(),
                record.vitals.systolic_bp,
                record.vitals.diastolic_bp,
                record.vitals.heart_rate,
                record.vitals.bmi,
                record.vitals.weight_kg,
                record.vitals.height_cm,
                record.labs.fasting_glucose,
                record.labs.hba1c,
                record.labs.total_cholesterol,
                record.labs.ldl_cholesterol,
                record.labs.hdl_cholesterol,
                record.labs.triglycerides,
                record.labs.creatinine,
                record.labs.bun,
                conditions,
                medications,
                allergies,
                record.history.family_diabetes as i32,
                record.history.family_heart_disease as i32,
                symptoms,
                record.created_at,
                record.name.to_lowercase(),
            ],
        )?;
        tracing::debug!(patient_id = %record.patient_id, "Patient record stored");
        Ok(())
    }

    fn count(&self) -> Result<usize, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockFailed)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// Internal row type for patient mapping
struct PatientRow {
    patient_id: String,
    name: String,
    age: Option<u32>,
    gender: String,
    vitals: VitalSigns,
    labs: LabResults,
    conditions: String,
    medications: String,
    allergies: String,
    family_diabetes: i32,
    family_heart_disease: i32,
    symptoms: String,
    created_at: DateTime<Utc>,
}

impl PatientRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            patient_id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            vitals: VitalSigns {
                systolic_bp: row.get(4)?,
                diastolic_bp: row.get(5)?,
                heart_rate: row.get(6)?,
                bmi: row.get(7)?,
                weight_kg: row.get(8)?,
                height_cm: row.get(9)?,
            },
            labs: LabResults {
                fasting_glucose: row.get(10)?,
                hba1c: row.get(11)?,
                total_cholesterol: row.get(12)?,
                ldl_cholesterol: row.get(13)?,
                hdl_cholesterol: row.get(14)?,
                triglycerides: row.get(15)?,
                creatinine: row.get(16)?,
                bun: row.get(17)?,
            },
            conditions: row.get(18)?,
            medications: row.get(19)?,
            allergies: row.get(20)?,
            family_diabetes: row.get(21)?,
            family_heart_disease: row.get(22)?,
            symptoms: row.get(23)?,
            created_at: row.get(24)?,
        })
    }
}

fn patient_from_row(row: PatientRow) -> Result<PatientRecord, DatabaseError> {
    Ok(PatientRecord {
        patient_id: row.patient_id,
        name: row.name,
        age: row.age,
        gender: Gender::from_str(&row.gender)?,
        vitals: row.vitals,
        labs: row.labs,
        history: MedicalHistory {
            conditions: serde_json::from_str(&row.conditions)?,
            medications: serde_json::from_str(&row.medications)?,
            allergies: serde_json::from_str(&row.allergies)?,
            family_diabetes: row.family_diabetes != 0,
            family_heart_disease: row.family_heart_disease != 0,
        },
        symptoms: serde_json::from_str(&row.symptoms)?,
        created_at: row.created_at,
    })
}
