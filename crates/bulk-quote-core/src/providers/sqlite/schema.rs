//! SQLite schema for the CUM catalog, supplier prices, and synonym dictionary.

/// Complete database schema for bulk-quote-core.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cum_catalog (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    cum_code            TEXT NOT NULL UNIQUE,
    principio_activo    TEXT NOT NULL,
    forma_farmaceutica  TEXT NOT NULL,
    concentracion_raw   TEXT NOT NULL,
    active              INTEGER NOT NULL DEFAULT 1,
    updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_catalog_active ON cum_catalog(active);
CREATE INDEX IF NOT EXISTS idx_catalog_principio_forma ON cum_catalog(principio_activo, forma_farmaceutica);

CREATE TABLE IF NOT EXISTS supplier_prices (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    cum_code        TEXT NOT NULL,
    supplier_id     TEXT NOT NULL,
    supplier_name   TEXT NOT NULL,
    supplier_code   TEXT,
    unit_price      REAL,
    min_unit_price  REAL,
    box_price       REAL,
    vat_fraction    REAL,
    valid_from      TEXT,
    valid_to        TEXT,
    published_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prices_cum_code ON supplier_prices(cum_code);
CREATE INDEX IF NOT EXISTS idx_prices_published_at ON supplier_prices(cum_code, published_at DESC);

CREATE TABLE IF NOT EXISTS synonym_dict (
    hospital_id     TEXT NOT NULL,
    normalized_raw  TEXT NOT NULL,
    cum_code        TEXT NOT NULL,
    confidence      REAL NOT NULL,
    resolver        TEXT NOT NULL,
    updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (hospital_id, normalized_raw)
);
"#;
