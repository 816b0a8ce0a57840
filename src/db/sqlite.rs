use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../resources/migrations/001_patients.sql")),
    (
        2,
        include_str!("../../resources/migrations/002_patient_name_search.sql"),
    ),
];

/// Version that introduced `patients.name_lower`.
const NAME_SEARCH_VERSION: i64 = 2;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = current_version(conn);

    for &(version, sql) in MIGRATIONS {
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(sql)
                .map_err(|e| DatabaseError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    if current_version < NAME_SEARCH_VERSION {
        backfill_name_lower(conn)?;
    }

    Ok(())
}

/// Fill `name_lower` with Unicode lowercase for rows written before it existed.
fn backfill_name_lower(conn: &Connection) -> Result<(), DatabaseError> {
    let mut select = conn.prepare("SELECT patient_id, name FROM patients")?;
    let names = select
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("UPDATE patients SET name_lower = ?1 WHERE patient_id = ?2")?;
    for (patient_id, name) in &names {
        stmt.execute(rusqlite::params![name.to_lowercase(), patient_id])?;
    }
    if !names.is_empty() {
        tracing::info!(rows = names.len(), "Backfilled patient name search column");
    }
    Ok(())
}

/// Current schema version (0 if no schema exists yet)
pub fn current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        assert_eq!(current_version(&conn), 2);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(run_migrations(&conn).is_ok());
        assert_eq!(current_version(&conn), 2);
    }

    #[test]
    fn patients_table_exists() {
        let conn = open_memory_database().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='patients'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn on_disk_database_persists_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellpath.db");
        drop(open_database(&path).unwrap());

        let conn = open_database(&path).unwrap();
        assert_eq!(current_version(&conn), 2);
    }

    #[test]
    fn upgrade_backfills_unicode_lowercase_names() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0].1).unwrap();
        conn.execute(
            "INSERT INTO patients (patient_id, name, gender, created_at)
             VALUES ('PT-1', 'Élodie Müller', 'female', '2024-01-01 00:00:00+00:00')",
            [],
        )
        .unwrap();
        assert_eq!(current_version(&conn), 1);

        run_migrations(&conn).unwrap();

        let folded: String = conn
            .query_row("SELECT name_lower FROM patients WHERE patient_id = 'PT-1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(folded, "élodie müller");
        assert_eq!(current_version(&conn), 2);
    }
}
