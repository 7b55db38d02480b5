//! `SynonymDictProvider` against the `synonym_dict` table.

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::model::SynonymDictEntry;
use crate::providers::{ProviderError, SynonymDictProvider};

impl SynonymDictProvider for Database {
    fn lookup(&self, hospital_id: &str, normalized_raw: &str) -> Result<Option<SynonymDictEntry>, ProviderError> {
        self.conn()
            .query_row(
                "SELECT hospital_id, normalized_raw, cum_code, confidence, resolver
                 FROM synonym_dict WHERE hospital_id = ?1 AND normalized_raw = ?2",
                params![hospital_id, normalized_raw],
                |row| {
                    Ok(SynonymDictEntry {
                        hospital_id: row.get(0)?,
                        normalized_raw: row.get(1)?,
                        cum_code: row.get(2)?,
                        confidence: row.get(3)?,
                        resolver: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(ProviderError::from)
    }

    fn insert(&self, entry: &SynonymDictEntry) -> Result<(), ProviderError> {
        self.conn().execute(
            "INSERT INTO synonym_dict (hospital_id, normalized_raw, cum_code, confidence, resolver, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
             ON CONFLICT(hospital_id, normalized_raw) DO UPDATE SET
                 cum_code = excluded.cum_code,
                 confidence = excluded.confidence,
                 resolver = excluded.resolver,
                 updated_at = datetime('now')",
            params![entry.hospital_id, entry.normalized_raw, entry.cum_code, entry.confidence, entry.resolver],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hospital: &str, raw: &str, cum: &str) -> SynonymDictEntry {
        SynonymDictEntry {
            hospital_id: hospital.to_string(),
            normalized_raw: raw.to_string(),
            cum_code: cum.to_string(),
            confidence: 0.95,
            resolver: "pharmacist-1".to_string(),
        }
    }

    #[test]
    fn lookup_miss_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.lookup("hosp-1", "acetaminofen 500mg tableta").unwrap().is_none());
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&entry("hosp-1", "tylex 500", "19900001-1")).unwrap();
        let found = db.lookup("hosp-1", "tylex 500").unwrap().unwrap();
        assert_eq!(found.cum_code, "19900001-1");
    }

    #[test]
    fn later_insert_supersedes_earlier_one() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&entry("hosp-1", "tylex 500", "19900001-1")).unwrap();
        db.insert(&entry("hosp-1", "tylex 500", "19900002-1")).unwrap();
        let found = db.lookup("hosp-1", "tylex 500").unwrap().unwrap();
        assert_eq!(found.cum_code, "19900002-1");
    }

    #[test]
    fn dictionary_is_scoped_per_hospital() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&entry("hosp-1", "tylex 500", "19900001-1")).unwrap();
        assert!(db.lookup("hosp-2", "tylex 500").unwrap().is_none());
    }
}
