pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::InMemoryPatientStore;
pub use repository::SqlitePatientStore;
pub use sqlite::*;

use thiserror::Error;

use crate::models::PatientRecord;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockFailed,
}

impl DatabaseError {
    pub(crate) fn patient_not_found(id: &str) -> Self {
        Self::NotFound {
            entity_type: "patient".into(),
            id: id.to_string(),
        }
    }
}

/// Source of patient records for analysis.
///
/// Records are replaced whole on insert; there is no partial update.
pub trait PatientStore: Send + Sync {
    fn find_by_id(&self, id: &str) -> Result<PatientRecord, DatabaseError>;

    /// Case-insensitive substring match on name, ordered by name then id.
    fn find_by_name(&self, query: &str) -> Result<Vec<PatientRecord>, DatabaseError>;

    fn list_all(&self) -> Result<Vec<PatientRecord>, DatabaseError>;

    fn insert(&self, record: &PatientRecord) -> Result<(), DatabaseError>;

    fn count(&self) -> Result<usize, DatabaseError>;
}
