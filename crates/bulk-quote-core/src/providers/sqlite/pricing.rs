//! `PriceProvider` against the `supplier_prices` table.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::Database;
use crate::model::PriceRow;
use crate::providers::{PriceProvider, ProviderError};

fn parse_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc))
}

impl PriceProvider for Database {
    fn prices_for(&self, cum_code: &str) -> Result<Vec<PriceRow>, ProviderError> {
        let mut stmt = self.conn().prepare(
            "SELECT supplier_id, supplier_name, supplier_code, unit_price, min_unit_price,
                    box_price, vat_fraction, valid_from, valid_to, published_at
             FROM supplier_prices WHERE cum_code = ?1
             ORDER BY published_at DESC",
        )?;
        let rows = stmt.query_map(params![cum_code], |row| {
            let published_at: String = row.get(9)?;
            Ok(PriceRow {
                supplier_id: row.get(0)?,
                supplier_name: row.get(1)?,
                supplier_code: row.get(2)?,
                unit_price: row.get(3)?,
                min_unit_price: row.get(4)?,
                box_price: row.get(5)?,
                vat_fraction: row.get(6)?,
                valid_from: parse_datetime(row.get(7)?),
                valid_to: parse_datetime(row.get(8)?),
                published_at: DateTime::parse_from_rfc3339(&published_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_price(db: &Database, cum_code: &str, supplier: &str, unit_price: f64, published_at: &str) {
        db.conn()
            .execute(
                "INSERT INTO supplier_prices (cum_code, supplier_id, supplier_name, unit_price, published_at)
                 VALUES (?1, ?2, ?2, ?3, ?4)",
                params![cum_code, supplier, unit_price, published_at],
            )
            .unwrap();
    }

    #[test]
    fn prices_for_returns_only_matching_cum_code() {
        let db = Database::open_in_memory().unwrap();
        insert_price(&db, "19900001-1", "sup-a", 100.0, "2026-01-01T00:00:00Z");
        insert_price(&db, "19900002-1", "sup-b", 200.0, "2026-01-01T00:00:00Z");
        let rows = db.prices_for("19900001-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].supplier_id, "sup-a");
    }

    #[test]
    fn prices_for_unknown_code_is_empty() {
        let db = Database::open_in_memory().unwrap();
        let rows = db.prices_for("nonexistent").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn prices_for_orders_by_published_at_descending() {
        let db = Database::open_in_memory().unwrap();
        insert_price(&db, "19900001-1", "sup-a", 850.0, "2026-01-05T00:00:00Z");
        insert_price(&db, "19900001-1", "sup-b", 900.0, "2026-02-10T00:00:00Z");
        let rows = db.prices_for("19900001-1").unwrap();
        assert_eq!(rows[0].supplier_id, "sup-b");
        assert_eq!(rows[1].supplier_id, "sup-a");
    }
}
