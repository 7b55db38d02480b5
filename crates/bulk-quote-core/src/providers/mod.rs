//! Provider traits: the seams between the core pipeline and whatever
//! store backs the CUM catalog, supplier prices, and the per-hospital
//! synonym dictionary. The core never talks to SQLite directly — it talks
//! to these traits, and `sqlite` is this crate's one concrete backend.

pub mod sqlite;

use thiserror::Error;

/// Errors a provider implementation can surface. The matcher and
/// orchestrator propagate these as-is; only the orchestrator's job-level
/// wrapper ([`crate::orchestrator::OrchestratorError`]) ever turns one into
/// something terminal.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// One candidate row surfaced by [`CatalogProvider`]. `inn_score` is
/// populated by `find_fuzzy`/`find_closest` (the trigram similarity against
/// the query) and left `None` by `find_exact`, which doesn't need a score.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCandidate {
    pub cum_code: String,
    pub principio_activo: String,
    pub forma_farmaceutica: String,
    pub concentracion_raw: String,
    pub active: bool,
    pub inn_score: Option<f64>,
}

/// The regulated CUM catalog lookup. Stage 1/2/3 of the matcher each call
/// exactly one of these methods; none of them apply the Hard Barrier
/// themselves — that stays in `matcher`, so any backend can be swapped in
/// without re-implementing the safety check.
pub trait CatalogProvider {
    /// Active rows whose `principio_activo` and `forma_farmaceutica` match
    /// `inn_query`/`form` exactly (case-insensitive). Order is the
    /// candidate's natural catalog row order — the matcher takes the first
    /// one whose concentration also matches.
    fn find_exact(&self, inn_query: &str, form: &str) -> Result<Vec<CatalogCandidate>, ProviderError>;

    /// Active rows whose `principio_activo` trigram-similarity to
    /// `inn_query` is at least `threshold`, ordered by that similarity
    /// descending and capped at `limit`.
    fn find_fuzzy(&self, inn_query: &str, threshold: f64, limit: usize) -> Result<Vec<CatalogCandidate>, ProviderError>;

    /// The single highest-similarity active row for `inn_query`, regardless
    /// of threshold — feeds `MatchResult::closest_candidate` on a
    /// `NO_MATCH`. Purely informational; never auto-resolved.
    fn find_closest(&self, inn_query: &str) -> Result<Option<CatalogCandidate>, ProviderError>;
}

/// Supplier price lookup for an already-resolved CUM code.
pub trait PriceProvider {
    /// Every known price row for `cum_code`, in no particular order — the
    /// caller runs [`crate::pricing::select_prices`] to sort and cap.
    fn prices_for(&self, cum_code: &str) -> Result<Vec<crate::model::PriceRow>, ProviderError>;
}

/// The per-hospital synonym dictionary the matcher's Pre-stage consults
/// before running the normalization pipeline at all.
pub trait SynonymDictProvider {
    fn lookup(&self, hospital_id: &str, normalized_raw: &str) -> Result<Option<crate::model::SynonymDictEntry>, ProviderError>;

    /// Upsert on `(hospital_id, normalized_raw)` — a later insert for the
    /// same key supersedes an earlier one.
    fn insert(&self, entry: &crate::model::SynonymDictEntry) -> Result<(), ProviderError>;
}
