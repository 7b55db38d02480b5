//! The parser's output model: components, form, warnings, and `ParsedDrug`.

use serde::{Deserialize, Serialize};

use super::concentration::NormalizedConcentration;

/// The exhaustive parser warning taxonomy. Two of these are blocking
/// (see [`ParsedDrug::is_matchable`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ParserWarning {
    AmbiguousDecimal,
    BracketRatioInconsistent,
    ComponentCountMismatch,
    FormNotRecognized,
    InnNotInSynonymTable,
    NoConcentrationFound,
    ParenSynonymUnresolved,
    UnparseableBracket,
}

impl ParserWarning {
    /// Blocking warnings force the matcher to refuse the row outright.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            ParserWarning::ComponentCountMismatch | ParserWarning::AmbiguousDecimal
        )
    }
}

/// A single active ingredient, resolved against the INN synonym table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugComponent {
    /// The INN text as it appeared in the input, after Layer 0/1 cleanup
    /// but before synonym resolution.
    pub raw_inn: String,
    /// The catalog-spelling INN this component resolves to. Equal to
    /// `raw_inn` when no synonym-table mapping exists.
    pub canonical_inn: String,
    /// Alternate spellings observed for this component (e.g. the
    /// parenthetical form when a paren-synonym was present).
    pub aliases: Vec<String>,
}

/// The coarse administration-route category. Cross-group matches are a
/// Hard Barrier rejection in the matcher, never a fuzzy-scored penalty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FormGroup {
    OralSolid,
    OralLiquid,
    Injectable,
    Topical,
    Ophthalmic,
    Inhalation,
    RectalVaginal,
    Other,
}

/// A pharmaceutical form, resolved against the form synonym table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PharmaceuticalForm {
    pub canonical_form_name: String,
    pub form_group: FormGroup,
}

/// The full output of [`crate::parser::parse`]. Never constructed by
/// anything other than the parser; `warnings` is the sole error channel —
/// the parser never returns `Result::Err`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedDrug {
    pub raw_input: String,
    pub components: Vec<DrugComponent>,
    pub concentrations: Vec<NormalizedConcentration>,
    pub canonical_form: Option<String>,
    pub form_group: Option<FormGroup>,
    pub warnings: Vec<ParserWarning>,
}

impl ParsedDrug {
    /// False iff `warnings` intersects `{ComponentCountMismatch,
    /// AmbiguousDecimal}`. The matcher's guard clause relies on this.
    pub fn is_matchable(&self) -> bool {
        !self.warnings.iter().any(|w| w.is_blocking())
    }

    pub fn is_combo(&self) -> bool {
        self.components.len() > 1
    }

    /// Selects the concentration to use for matching when more than one
    /// was parsed for a mono-drug, by encoding priority:
    /// `bracket_ratio > inline > bracket_simple > inline_percent`.
    pub fn canonical_concentration(&self) -> Option<&NormalizedConcentration> {
        self.concentrations.iter().min_by_key(|c| c.encoding)
    }

    /// The INN query string the matcher builds for Stage 1/Stage 2:
    /// canonical INNs sorted and joined by `" / "` for combos, bare for
    /// mono-drugs.
    pub fn inn_query(&self) -> String {
        if self.components.len() <= 1 {
            return self
                .components
                .first()
                .map(|c| c.canonical_inn.clone())
                .unwrap_or_default();
        }
        let mut inns: Vec<&str> = self.components.iter().map(|c| c.canonical_inn.as_str()).collect();
        inns.sort_unstable();
        inns.join(" / ")
    }
}
