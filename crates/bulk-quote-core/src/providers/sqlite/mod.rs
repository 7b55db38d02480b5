//! rusqlite-backed implementation of [`crate::providers::CatalogProvider`],
//! [`crate::providers::PriceProvider`] and
//! [`crate::providers::SynonymDictProvider`].

mod catalog;
mod pricing;
mod schema;
mod synonym;

use std::path::Path;

use rusqlite::Connection;

use crate::providers::ProviderError;
use schema::SCHEMA;

/// A single SQLite connection, implementing all three provider traits.
/// There is one concrete backend in this crate; a second backend would
/// only need to implement the same traits, never touch this struct.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating the schema if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create an in-memory database (tests, and single-shot CLI runs).
    pub fn open_in_memory() -> Result<Self, ProviderError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), ProviderError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Raw connection access, for seeding fixtures in tests.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_initializes_schema() {
        let db = Database::open_in_memory().unwrap();
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"cum_catalog".to_string()));
        assert!(tables.contains(&"supplier_prices".to_string()));
        assert!(tables.contains(&"synonym_dict".to_string()));
    }

    #[test]
    fn open_on_disk_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite3");

        {
            let db = Database::open(&path).unwrap();
            db.conn()
                .execute(
                    "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
                     VALUES ('19900001-1', 'acetaminofen', 'tableta', '500mg', 1)",
                    [],
                )
                .unwrap();
        }

        let reopened = Database::open(&path).unwrap();
        let count: i64 = reopened.conn().query_row("SELECT COUNT(*) FROM cum_catalog", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }
}
