//! The 4-layer deterministic drug-name normalization pipeline.
//!
//! ```text
//! Layer 0  sanitize            Unicode NFC, lowercase, whitespace collapse
//! Layer 1  segment             bracket/paren extraction, form detection,
//!                               combo splitting, INN/dose separation
//! Layer 2  values               decimal locale resolution, unit/ratio
//!                               canonicalization, INN synonym resolution
//! Layer 3  form_normalize       pharmaceutical form → canonical + group
//! ```
//!
//! [`parse`] never returns `Result::Err` — every failure mode is
//! communicated through [`crate::model::ParserWarning`] so the caller can
//! decide whether a row is still safe to send to the matcher
//! ([`crate::model::ParsedDrug::is_matchable`]).

mod form_normalize;
mod sanitize;
mod segment;
mod values;

pub use sanitize::sanitize;
pub(crate) use form_normalize::normalize_form;

use crate::model::{ConcentrationEncoding, NormalizedConcentration, ParsedDrug, ParserWarning};
use crate::tables::{FormTable, InnSynonymTable, UnitTable};

/// Re-parse a catalog row's raw concentration text (e.g. `"500mg"`,
/// `"100mg/5mL"`) the same way Layer 2 parses a bracket's content. Used by
/// the matcher to re-derive a [`NormalizedConcentration`] for the Hard
/// Barrier check — catalog rows don't carry a pre-parsed value, only the
/// text the regulator published.
pub(crate) fn reparse_concentration(raw: &str, units: &UnitTable) -> Option<NormalizedConcentration> {
    let mut discard = Vec::new();
    values::parse_bracket_concentration(raw, units, &mut discard)
}

/// Run the full normalization pipeline over one free-text product name.
pub fn parse(raw: &str) -> ParsedDrug {
    parse_with_tables(raw, &UnitTable::new(), &InnSynonymTable::new(), &FormTable::new())
}

/// Same as [`parse`] but against caller-supplied tables — used by tests
/// and by any future per-hospital table overrides.
pub fn parse_with_tables(raw: &str, units: &UnitTable, inn_table: &InnSynonymTable, form_table: &FormTable) -> ParsedDrug {
    let mut warnings = Vec::new();

    let sanitized = sanitize::sanitize(raw);
    if sanitized.is_empty() {
        return ParsedDrug {
            raw_input: raw.to_string(),
            components: vec![],
            concentrations: vec![],
            canonical_form: None,
            form_group: None,
            warnings: vec![ParserWarning::NoConcentrationFound],
        };
    }

    let known_forms = form_table.spellings_longest_first();
    let seg = segment::segment(&sanitized, units, &known_forms);

    let mut inn_parts: Vec<String> = Vec::new();
    let mut dose_parts: Vec<String> = Vec::new();
    for s in &seg.segments {
        if !s.inn_text.is_empty() {
            inn_parts.push(s.inn_text.clone());
        }
        if let Some(dose) = &s.dose_text {
            dose_parts.push(dose.clone());
        }
    }

    let inline_concentrations: Vec<_> = dose_parts.iter().filter_map(|d| values::parse_inline_dose(d, units, &mut warnings)).collect();

    let bracket_concentrations: Vec<_> = seg.bracket_contents.iter().filter_map(|b| values::parse_bracket_concentration(b, units, &mut warnings)).collect();

    let pct_conc = inline_concentrations.iter().find(|c| c.encoding == ConcentrationEncoding::InlinePercent);
    let bracket_ratio = bracket_concentrations.iter().find(|c| c.encoding == ConcentrationEncoding::BracketRatio);
    if let (Some(pct), Some(ratio)) = (pct_conc, bracket_ratio) {
        values::validate_percent_vs_bracket(pct, ratio, &mut warnings);
    }

    let all_concentrations = if inn_parts.len() > 1 {
        inline_concentrations.clone()
    } else {
        bracket_concentrations.iter().chain(inline_concentrations.iter()).cloned().collect()
    };

    if all_concentrations.is_empty() {
        warnings.push(ParserWarning::NoConcentrationFound);
    }

    let mut components: Vec<_> = inn_parts
        .iter()
        .enumerate()
        .map(|(i, inn_raw)| {
            let parens: &[String] = if i == 0 { &seg.paren_contents } else { &[] };
            values::build_drug_component(inn_raw, parens, inn_table, &mut warnings)
        })
        .collect();

    if components.len() > 1 && inline_concentrations.len() != components.len() {
        warnings.push(ParserWarning::ComponentCountMismatch);
    }

    if components.is_empty() {
        let fallback = if seg.after_form.is_empty() { sanitized.as_str() } else { seg.after_form.as_str() };
        components.push(values::build_drug_component(fallback, &seg.paren_contents, inn_table, &mut warnings));
    }

    let (canonical_form, form_group) = form_normalize::normalize_form(seg.raw_form.as_deref(), form_table, &mut warnings);

    ParsedDrug {
        raw_input: raw.to_string(),
        components,
        concentrations: all_concentrations,
        canonical_form,
        form_group,
        warnings,
    }
}
