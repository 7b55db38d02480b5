//! The matcher's output model: `MatchResult`, its stage tag, and reject reasons.

use serde::{Deserialize, Serialize};

use super::parsed::ParserWarning;

/// Which pipeline stage produced a `MatchResult`. Mirrors the matcher's
/// state machine: `SYNONYM_DICT` bypasses everything, `EXACT` and
/// `FUZZY_INN_SAFE` are the two ways Stage 1/Stage 2 can succeed, `NO_MATCH`
/// covers the guard clause and an exhausted Stage 3, and `ERROR` is only
/// ever produced by the orchestrator wrapping a per-row failure — the
/// matcher itself never returns it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStage {
    SynonymDict,
    Exact,
    FuzzyInnSafe,
    NoMatch,
    Error,
}

/// The exhaustive reject-reason taxonomy, attached only to `NO_MATCH`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejectReason {
    ConcentrationMismatch,
    ConcentrationParseFailed,
    FormGroupMismatch,
    InnSimilarityTooLow,
    DrugInactive,
    InputNotMatchable,
    NoCandidates,
    ProcessingError,
}

/// An informational, never-auto-resolved pointer to the closest catalog
/// row for a `NO_MATCH`, attached so a human reviewer doesn't start from
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosestCandidate {
    pub cum_code: String,
    pub principio_activo: String,
    pub forma_farmaceutica: String,
    pub inn_score: f64,
}

/// The matcher's public result type. A closed tagged variant: every field
/// below is populated according to `stage`, never guessed at by callers —
/// exhaustive matching on `stage` is the safety net the rest of the
/// pipeline relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub stage: MatchStage,
    pub cum_code: Option<String>,
    pub principio_activo: Option<String>,
    pub forma_farmaceutica: Option<String>,
    pub concentracion: Option<String>,
    pub inn_score: Option<f64>,
    pub confidence: f64,
    pub reject_reason: Option<RejectReason>,
    pub closest_candidate: Option<ClosestCandidate>,
    pub parser_warnings: Vec<ParserWarning>,
}

impl MatchResult {
    pub fn no_match(reason: RejectReason, warnings: Vec<ParserWarning>) -> Self {
        Self {
            stage: MatchStage::NoMatch,
            cum_code: None,
            principio_activo: None,
            forma_farmaceutica: None,
            concentracion: None,
            inn_score: None,
            confidence: 0.0,
            reject_reason: Some(reason),
            closest_candidate: None,
            parser_warnings: warnings,
        }
    }

    pub fn error(warnings: Vec<ParserWarning>) -> Self {
        Self {
            stage: MatchStage::Error,
            cum_code: None,
            principio_activo: None,
            forma_farmaceutica: None,
            concentracion: None,
            inn_score: None,
            confidence: 0.0,
            reject_reason: Some(RejectReason::ProcessingError),
            closest_candidate: None,
            parser_warnings: warnings,
        }
    }

    /// Whether this row counts toward the orchestrator's `with_match` rate:
    /// anything but `NO_MATCH` and `ERROR`.
    pub fn has_match(&self) -> bool {
        !matches!(self.stage, MatchStage::NoMatch | MatchStage::Error)
    }
}
