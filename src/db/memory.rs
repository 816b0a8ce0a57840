use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{DatabaseError, PatientStore};
use crate::models::PatientRecord;

/// Patient store held in process memory, keyed by patient id.
#[derive(Debug, Default)]
pub struct InMemoryPatientStore {
    records: RwLock<BTreeMap<String, PatientRecord>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = PatientRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.patient_id.clone(), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

fn sort_by_name(records: &mut [PatientRecord]) {
    records.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.patient_id.cmp(&b.patient_id))
    });
}

impl PatientStore for InMemoryPatientStore {
    fn find_by_id(&self, id: &str) -> Result<PatientRecord, DatabaseError> {
        let records = self.records.read().map_err(|_| DatabaseError::LockFailed)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| DatabaseError::patient_not_found(id))
    }

    fn find_by_name(&self, query: &str) -> Result<Vec<PatientRecord>, DatabaseError> {
        let needle = query.to_lowercase();
        let records = self.records.read().map_err(|_| DatabaseError::LockFailed)?;
        let mut found: Vec<PatientRecord> = records
            .values()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        sort_by_name(&mut found);
        Ok(found)
    }

    fn list_all(&self) -> Result<Vec<PatientRecord>, DatabaseError> {
        let records = self.records.read().map_err(|_| DatabaseError::LockFailed)?;
        Ok(records.values().cloned().collect())
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), DatabaseError> {
        let mut records = self.records.write().map_err(|_| DatabaseError::LockFailed)?;
        records.insert(record.patient_id.clone(), record.clone());
        Ok(())
    }

    fn count(&self) -> Result<usize, DatabaseError> {
        let records = self.records.read().map_err(|_| DatabaseError::LockFailed)?;
        Ok(records.len())
    }
}
