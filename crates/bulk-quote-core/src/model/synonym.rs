//! The per-hospital, human-curated synonym dictionary entry.

use serde::{Deserialize, Serialize};

/// A persisted `(hospital_id, normalized_raw) → cum_code` mapping, created
/// only by human resolution of a prior `NO_MATCH`/`FUZZY_INN_SAFE` row.
/// Consulted by the matcher's Pre-stage as an O(1) bypass of the full
/// normalization pipeline. Append-only: a later insert for the same key
/// supersedes an earlier one (upsert-on-conflict), never both being kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynonymDictEntry {
    pub hospital_id: String,
    pub normalized_raw: String,
    pub cum_code: String,
    pub confidence: f64,
    pub resolver: String,
}
