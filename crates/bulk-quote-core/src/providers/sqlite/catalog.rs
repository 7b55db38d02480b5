//! `CatalogProvider` against the `cum_catalog` table.
//!
//! The fuzzy methods (`find_fuzzy`/`find_closest`) have no SQL-level
//! similarity index to lean on — the bundled SQLite build carries no
//! `pg_trgm` equivalent — so they pull every active row and score it with
//! [`crate::trigram::similarity`] in Rust. Fine at catalog scale (tens of
//! thousands of rows); a deployment needing this at millions of rows would
//! want a dedicated trigram index table instead, but that's a different
//! provider implementation, not a change to the trait.

use rusqlite::params;

use super::Database;
use crate::providers::{CatalogCandidate, CatalogProvider, ProviderError};
use crate::trigram;

struct CatalogRow {
    cum_code: String,
    principio_activo: String,
    forma_farmaceutica: String,
    concentracion_raw: String,
    active: bool,
}

impl Database {
    fn active_catalog_rows(&self) -> Result<Vec<CatalogRow>, ProviderError> {
        let mut stmt = self.conn().prepare(
            "SELECT cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active
             FROM cum_catalog WHERE active = 1",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CatalogRow {
                cum_code: row.get(0)?,
                principio_activo: row.get(1)?,
                forma_farmaceutica: row.get(2)?,
                concentracion_raw: row.get(3)?,
                active: row.get::<_, i64>(4)? != 0,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl CatalogProvider for Database {
    fn find_exact(&self, inn_query: &str, form: &str) -> Result<Vec<CatalogCandidate>, ProviderError> {
        let mut stmt = self.conn().prepare(
            "SELECT cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active
             FROM cum_catalog
             WHERE active = 1
               AND lower(principio_activo) = lower(?1)
               AND lower(forma_farmaceutica) = lower(?2)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![inn_query, form], |row| {
            Ok(CatalogCandidate {
                cum_code: row.get(0)?,
                principio_activo: row.get(1)?,
                forma_farmaceutica: row.get(2)?,
                concentracion_raw: row.get(3)?,
                active: row.get::<_, i64>(4)? != 0,
                inn_score: None,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn find_fuzzy(&self, inn_query: &str, threshold: f64, limit: usize) -> Result<Vec<CatalogCandidate>, ProviderError> {
        let mut scored: Vec<CatalogCandidate> = self
            .active_catalog_rows()?
            .into_iter()
            .map(|row| {
                let score = trigram::similarity(inn_query, &row.principio_activo);
                CatalogCandidate {
                    cum_code: row.cum_code,
                    principio_activo: row.principio_activo,
                    forma_farmaceutica: row.forma_farmaceutica,
                    concentracion_raw: row.concentracion_raw,
                    active: row.active,
                    inn_score: Some(score),
                }
            })
            .filter(|c| c.inn_score.unwrap_or(0.0) >= threshold)
            .collect();

        // Stable sort: ties keep the catalog's natural row order.
        scored.sort_by(|a, b| b.inn_score.partial_cmp(&a.inn_score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    fn find_closest(&self, inn_query: &str) -> Result<Option<CatalogCandidate>, ProviderError> {
        let best = self
            .active_catalog_rows()?
            .into_iter()
            .map(|row| {
                let score = trigram::similarity(inn_query, &row.principio_activo);
                CatalogCandidate {
                    cum_code: row.cum_code,
                    principio_activo: row.principio_activo,
                    forma_farmaceutica: row.forma_farmaceutica,
                    concentracion_raw: row.concentracion_raw,
                    active: row.active,
                    inn_score: Some(score),
                }
            })
            .fold(None::<CatalogCandidate>, |best, candidate| match &best {
                Some(b) if b.inn_score.unwrap_or(0.0) >= candidate.inn_score.unwrap_or(0.0) => best,
                _ => Some(candidate),
            });
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(db: &Database) {
        db.conn()
            .execute(
                "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
                 VALUES ('19900001-1', 'acetaminofen', 'tableta', '500mg', 1)",
                [],
            )
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
                 VALUES ('19900002-1', 'acetaminofen', 'tableta', '325mg', 1)",
                [],
            )
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
                 VALUES ('19900003-1', 'acetaminofeno', 'solucion oral', '150mg/5mL', 0)",
                [],
            )
            .unwrap();
    }

    #[test]
    fn find_exact_matches_inn_and_form_case_insensitively() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let rows = db.find_exact("Acetaminofen", "Tableta").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.inn_score.is_none()));
    }

    #[test]
    fn find_fuzzy_excludes_inactive_and_orders_by_score_desc() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let rows = db.find_fuzzy("acetaminofen", 0.5, 10).unwrap();
        assert!(rows.iter().all(|r| r.active));
        assert!(rows.iter().all(|r| r.principio_activo == "acetaminofen"));
        for pair in rows.windows(2) {
            assert!(pair[0].inn_score.unwrap() >= pair[1].inn_score.unwrap());
        }
    }

    #[test]
    fn find_fuzzy_respects_limit() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        let rows = db.find_fuzzy("acetaminofen", 0.0, 1).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn find_closest_ignores_inactive_rows() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.conn()
            .execute(
                "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
                 VALUES ('19900004-1', 'ibuprofeno', 'tableta', '400mg', 1)",
                [],
            )
            .unwrap();
        // Exact spelling match is inactive (id 19900003-1); the closest
        // active row should be one of the active acetaminofen tablets.
        let closest = db.find_closest("acetaminofeno").unwrap();
        assert_ne!(closest.unwrap().cum_code, "19900003-1");
    }
}
