//! Catalog matcher: guard clause → synonym-dictionary pre-stage → Stage 1
//! exact → Stage 2 fuzzy-with-Hard-Barrier → Stage 3 no-match.
//!
//! Every stage that can reject a candidate does so on a safety check the
//! similarity score never overrides: an INN match at 0.99 similarity with
//! the wrong concentration is still a `NO_MATCH`, not a low-confidence
//! match. That's the Hard Barrier this module exists to enforce.

mod config;

pub use config::MatcherConfig;

use log::{debug, warn};

use crate::model::{ClosestCandidate, FormGroup, MatchResult, MatchStage, ParsedDrug, RejectReason};
use crate::providers::{CatalogCandidate, CatalogProvider, ProviderError, SynonymDictProvider};
use crate::tables::{strip_diacritics, FormTable, UnitTable};

/// Normalize raw input text into the synonym dictionary's lookup key:
/// lowercase, diacritic-stripped, whitespace-collapsed. Independent of the
/// parser pipeline on purpose — the dictionary is keyed on what a human
/// reviewer saw and typed, not on anything Layer 0-3 derives.
fn dict_key(raw_input: &str) -> String {
    let lower = raw_input.to_lowercase();
    strip_diacritics(&lower).split_whitespace().collect::<Vec<_>>().join(" ")
}

fn candidate_form_group(candidate: &CatalogCandidate, form_table: &FormTable) -> Option<FormGroup> {
    let mut discard = Vec::new();
    let (_, group) = crate::parser::normalize_form(Some(&candidate.forma_farmaceutica), form_table, &mut discard);
    group
}

/// Evaluate one Stage 2 candidate against both Hard Barriers. `Ok(())`
/// means the candidate survives and becomes the match; `Err` carries the
/// reason it was rejected, which the caller may surface as the eventual
/// `NO_MATCH`'s `reject_reason` if no later candidate survives either.
fn evaluate_fuzzy_candidate(candidate: &CatalogCandidate, parsed: &ParsedDrug, form_table: &FormTable, units: &UnitTable) -> Result<(), RejectReason> {
    if !candidate.active {
        return Err(RejectReason::DrugInactive);
    }

    if let (Some(candidate_group), Some(parsed_group)) = (candidate_form_group(candidate, form_table), parsed.form_group) {
        if candidate_group != parsed_group {
            return Err(RejectReason::FormGroupMismatch);
        }
    }

    let canonical = parsed.canonical_concentration().ok_or(RejectReason::ConcentrationParseFailed)?;
    let candidate_conc = crate::parser::reparse_concentration(&candidate.concentracion_raw, units).ok_or(RejectReason::ConcentrationParseFailed)?;
    if !canonical.matches(&candidate_conc) {
        return Err(RejectReason::ConcentrationMismatch);
    }
    Ok(())
}

fn build_exact(candidate: &CatalogCandidate, parsed: &ParsedDrug) -> MatchResult {
    MatchResult {
        stage: MatchStage::Exact,
        cum_code: Some(candidate.cum_code.clone()),
        principio_activo: Some(candidate.principio_activo.clone()),
        forma_farmaceutica: Some(candidate.forma_farmaceutica.clone()),
        concentracion: Some(candidate.concentracion_raw.clone()),
        inn_score: None,
        confidence: 1.0,
        reject_reason: None,
        closest_candidate: None,
        parser_warnings: parsed.warnings.clone(),
    }
}

fn build_fuzzy(candidate: &CatalogCandidate, parsed: &ParsedDrug) -> MatchResult {
    let score = candidate.inn_score.unwrap_or(0.0);
    MatchResult {
        stage: MatchStage::FuzzyInnSafe,
        cum_code: Some(candidate.cum_code.clone()),
        principio_activo: Some(candidate.principio_activo.clone()),
        forma_farmaceutica: Some(candidate.forma_farmaceutica.clone()),
        concentracion: Some(candidate.concentracion_raw.clone()),
        inn_score: Some(score),
        confidence: score,
        reject_reason: None,
        closest_candidate: None,
        parser_warnings: parsed.warnings.clone(),
    }
}

/// Run the full matcher pipeline for one already-parsed row against one
/// hospital's synonym dictionary and the shared catalog.
pub fn match_drug(
    parsed: &ParsedDrug,
    hospital_id: &str,
    catalog: &dyn CatalogProvider,
    synonyms: &dyn SynonymDictProvider,
    config: &MatcherConfig,
) -> Result<MatchResult, ProviderError> {
    if !parsed.is_matchable() {
        debug!("row blocked by parser warnings: {:?}", parsed.warnings);
        return Ok(MatchResult::no_match(RejectReason::InputNotMatchable, parsed.warnings.clone()));
    }

    let key = dict_key(&parsed.raw_input);
    if let Some(entry) = synonyms.lookup(hospital_id, &key)? {
        debug!("synonym dictionary hit for hospital {hospital_id}, key '{key}' -> {}", entry.cum_code);
        return Ok(MatchResult {
            stage: MatchStage::SynonymDict,
            cum_code: Some(entry.cum_code),
            principio_activo: None,
            forma_farmaceutica: None,
            concentracion: None,
            inn_score: None,
            confidence: entry.confidence,
            reject_reason: None,
            closest_candidate: None,
            parser_warnings: parsed.warnings.clone(),
        });
    }

    let inn_query = parsed.inn_query();
    let units = UnitTable::new();
    let form_table = FormTable::new();

    if let Some(form) = parsed.canonical_form.as_deref() {
        if let Some(canonical) = parsed.canonical_concentration() {
            for candidate in catalog.find_exact(&inn_query, form)? {
                if !candidate.active {
                    continue;
                }
                if let Some(candidate_conc) = crate::parser::reparse_concentration(&candidate.concentracion_raw, &units) {
                    if canonical.matches(&candidate_conc) {
                        debug!("stage1 exact match: '{inn_query}' + '{form}' -> {}", candidate.cum_code);
                        return Ok(build_exact(&candidate, parsed));
                    }
                }
            }
        }
    }

    let fuzzy = catalog.find_fuzzy(&inn_query, config.trigram_threshold, config.stage2_candidate_limit)?;
    let mut last_reject = None;
    for candidate in &fuzzy {
        match evaluate_fuzzy_candidate(candidate, parsed, &form_table, &units) {
            Ok(()) => {
                debug!("stage2 fuzzy match: '{inn_query}' -> {} (score {:.3})", candidate.cum_code, candidate.inn_score.unwrap_or(0.0));
                return Ok(build_fuzzy(candidate, parsed));
            }
            Err(reason) => {
                warn!("hard barrier rejected candidate {}: {reason:?}", candidate.cum_code);
                last_reject = Some(reason);
            }
        }
    }

    let closest = catalog.find_closest(&inn_query)?;
    let reason = if fuzzy.is_empty() {
        RejectReason::NoCandidates
    } else {
        last_reject.unwrap_or(RejectReason::InnSimilarityTooLow)
    };

    let mut result = MatchResult::no_match(reason, parsed.warnings.clone());
    result.closest_candidate = closest.map(|c| ClosestCandidate {
        cum_code: c.cum_code,
        principio_activo: c.principio_activo,
        forma_farmaceutica: c.forma_farmaceutica,
        inn_score: c.inn_score.unwrap_or(0.0),
    });
    Ok(result)
}
