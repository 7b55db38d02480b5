//! Layer 2 — value normalization: locale-aware decimal resolution, unit
//! canonicalization, bracket-ratio simplification, percent/ratio
//! arithmetic consistency, and INN text normalization (diacritics, salt
//! suffixes, synonym/parenthetical resolution).

use crate::model::{ConcentrationEncoding, DrugComponent, NormalizedConcentration, ParserWarning, Unit};
use crate::tables::{strip_diacritics, strip_salt_suffix, InnSynonymTable, UnitTable};

/// Resolve a number string that may use a European decimal comma or a
/// thousands-separator comma.
///
/// - No comma: parse directly (a `.` is a decimal point).
/// - One comma followed by exactly 3 digits (`"25,000"`): thousands
///   separator, drop the comma.
/// - One comma followed by 1-2 digits (`"37,5"`): decimal comma.
/// - One comma followed by 4+ digits, or more than one comma: ambiguous —
///   emit [`ParserWarning::AmbiguousDecimal`] and fall back to a
///   best-effort parse.
pub fn resolve_decimal(num_str: &str, warnings: &mut Vec<ParserWarning>) -> f64 {
    let cleaned: String = num_str.chars().filter(|c| !c.is_whitespace()).collect();

    if !cleaned.contains(',') {
        return cleaned.parse::<f64>().unwrap_or_else(|_| {
            warnings.push(ParserWarning::AmbiguousDecimal);
            0.0
        });
    }

    let parts: Vec<&str> = cleaned.split(',').collect();
    if parts.len() == 2 {
        let (before, after) = (parts[0], parts[1]);
        if after.len() == 3 && after.chars().all(|c| c.is_ascii_digit()) {
            return format!("{before}{after}").parse().unwrap_or(0.0);
        }
        if (1..=2).contains(&after.len()) && after.chars().all(|c| c.is_ascii_digit()) {
            return format!("{before}.{after}").parse().unwrap_or(0.0);
        }
        warnings.push(ParserWarning::AmbiguousDecimal);
        return format!("{before}.{after}").parse().unwrap_or(0.0);
    }

    warnings.push(ParserWarning::AmbiguousDecimal);
    cleaned.replace(',', "").parse().unwrap_or(0.0)
}

fn scan_number(chars: &[char], mut i: usize) -> Option<(usize, String)> {
    let start = i;
    if i >= chars.len() || !chars[i].is_ascii_digit() {
        return None;
    }
    while i < chars.len() && (chars[i].is_ascii_digit() || ((chars[i] == '.' || chars[i] == ',') && i + 1 < chars.len() && chars[i + 1].is_ascii_digit())) {
        i += 1;
    }
    Some((i, chars[start..i].iter().collect()))
}

fn skip_spaces(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i] == ' ' {
        i += 1;
    }
    i
}

fn scan_letters(chars: &[char], mut i: usize) -> (usize, String) {
    let start = i;
    while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '%') {
        i += 1;
    }
    (i, chars[start..i].iter().collect())
}

/// Parse `"325mg"`, `"2%"`, `"25,000ui/ml"` — a single number immediately
/// (modulo whitespace) followed by a recognized unit spelling, consuming
/// the whole string.
pub fn parse_inline_dose(dose_str: &str, units: &UnitTable, warnings: &mut Vec<ParserWarning>) -> Option<NormalizedConcentration> {
    let chars: Vec<char> = dose_str.trim().chars().collect();
    let (after_num, num_str) = scan_number(&chars, 0)?;
    let i = skip_spaces(&chars, after_num);
    let (after_unit, unit_str) = scan_unit(&chars, i, units)?;
    if after_unit != chars.len() {
        return None;
    }
    let unit = units.canonicalize(&unit_str)?;
    let encoding = if matches!(unit, Unit::Percent) { ConcentrationEncoding::InlinePercent } else { ConcentrationEncoding::Inline };
    let value = resolve_decimal(&num_str, warnings);
    Some(NormalizedConcentration::from_f64(value, unit, encoding))
}

/// Scan the longest unit run starting at `i` that canonicalizes
/// successfully, trying progressively shorter prefixes so a compound
/// spelling (`ui/ml`) wins over its simple prefix (`ui`).
fn scan_unit(chars: &[char], i: usize, units: &UnitTable) -> Option<(usize, String)> {
    let (end, _) = scan_unit_run(chars, i);
    let mut cut = end;
    while cut > i {
        let candidate: String = chars[i..cut].iter().collect();
        if units.canonicalize(&candidate).is_some() {
            return Some((cut, candidate));
        }
        cut -= 1;
    }
    None
}

fn scan_unit_run(chars: &[char], mut i: usize) -> (usize, String) {
    let start = i;
    while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '%' || chars[i] == '/') {
        i += 1;
    }
    (i, chars[start..i].iter().collect())
}

/// Like [`scan_unit_run`] but stops at `/` — used for the two sides of a
/// bracket ratio, where the slash is the ratio separator, not part of the
/// unit spelling.
fn scan_plain_unit_letters(chars: &[char], mut i: usize) -> (usize, String) {
    let start = i;
    while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '%') {
        i += 1;
    }
    (i, chars[start..i].iter().collect())
}

/// Parse a `[...]` bracket's content: either a ratio (`"100mg/5mL"`,
/// simplified to a compound unit) or a simple dose (`"500mg"`).
pub fn parse_bracket_concentration(bracket_content: &str, units: &UnitTable, warnings: &mut Vec<ParserWarning>) -> Option<NormalizedConcentration> {
    if let Some(conc) = parse_bracket_ratio(bracket_content, units, warnings) {
        return Some(conc);
    }

    let chars: Vec<char> = bracket_content.trim().chars().collect();
    let (after_num, num_str) = scan_number(&chars, 0)?;
    let i = skip_spaces(&chars, after_num);
    let (after_unit, unit_str) = scan_unit(&chars, i, units)?;
    if after_unit != chars.len() {
        warnings.push(ParserWarning::UnparseableBracket);
        return None;
    }
    let unit = units.canonicalize(&unit_str)?;
    let value = resolve_decimal(&num_str, warnings);
    Some(NormalizedConcentration::from_f64(value, unit, ConcentrationEncoding::BracketSimple))
}

/// `"100mg/5mL"` → `20 mg/mL`. Both sides must be plain (non-compound)
/// recognized units; a zero denominator is an [`ParserWarning::UnparseableBracket`],
/// never a division by zero.
fn parse_bracket_ratio(content: &str, units: &UnitTable, warnings: &mut Vec<ParserWarning>) -> Option<NormalizedConcentration> {
    let chars: Vec<char> = content.trim().chars().collect();
    let (after_num1, num1_str) = scan_number(&chars, 0)?;
    let i = skip_spaces(&chars, after_num1);
    let (after_unit1, unit1_str) = scan_plain_unit_letters(&chars, i);
    if after_unit1 == i {
        return None;
    }
    let i = skip_spaces(&chars, after_unit1);
    if chars.get(i) != Some(&'/') {
        return None;
    }
    let i = skip_spaces(&chars, i + 1);
    let (after_num2, num2_str) = scan_number(&chars, i)?;
    let i = skip_spaces(&chars, after_num2);
    let (after_unit2, unit2_str) = scan_plain_unit_letters(&chars, i);
    if after_unit2 == i {
        return None;
    }
    let i = skip_spaces(&chars, after_unit2);
    if i != chars.len() {
        return None;
    }

    let unit1 = units.canonicalize(&unit1_str)?;
    let unit2 = units.canonicalize(&unit2_str)?;
    if matches!(unit1, Unit::Compound(..)) || matches!(unit2, Unit::Compound(..)) {
        return None;
    }

    let v1 = resolve_decimal(&num1_str, warnings);
    let v2 = resolve_decimal(&num2_str, warnings);
    if v2 == 0.0 {
        warnings.push(ParserWarning::UnparseableBracket);
        return None;
    }

    let simplified = v1 / v2;
    let compound = Unit::Compound(Box::new(unit1), Box::new(unit2));
    Some(NormalizedConcentration::from_f64(simplified, compound, ConcentrationEncoding::BracketRatio))
}

/// Assert `pct` (a `%` reading) and `bracket` (a simplified ratio) are
/// arithmetically consistent for the same drug: `1% (w/v) == 10 mg/mL`.
/// Only checked when the bracket's canonical unit is exactly `mg/mL`.
/// Never blocking — the matcher always prefers the bracket form regardless.
pub fn validate_percent_vs_bracket(pct: &NormalizedConcentration, bracket: &NormalizedConcentration, warnings: &mut Vec<ParserWarning>) {
    if bracket.unit.canonical() != "mg/mL" {
        return;
    }
    let expected = pct.value() * 10.0;
    if (expected - bracket.value()).abs() > 0.01 * bracket.value() {
        warnings.push(ParserWarning::BracketRatioInconsistent);
    }
}

/// Diacritic-strip, salt-suffix-strip, and whitespace-collapse raw INN
/// text for synonym-table lookup. Does not lowercase — Layer 0 already did.
pub fn normalize_inn_text(raw: &str) -> String {
    let ascii = strip_diacritics(raw);
    let stripped = strip_salt_suffix(&ascii);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve the canonical INN and alias list when a parenthetical synonym
/// was present, per the precedence documented for this pipeline:
/// 1. the paren content is itself in the synonym table → promote it to
///    canonical, keep the raw text as an alias;
/// 2. else the raw text is in the synonym table → raw stays canonical,
///    paren content becomes an alias;
/// 3. else neither is recognized → raw stays canonical, paren content is
///    kept as an alias, and [`ParserWarning::ParenSynonymUnresolved`] is emitted.
pub fn resolve_paren_synonym(paren_content: &str, normalized_raw: &str, table: &InnSynonymTable, warnings: &mut Vec<ParserWarning>) -> (String, Vec<String>) {
    let paren_lower = paren_content.trim().to_lowercase();
    let paren_normalized = normalize_inn_text(&paren_lower);

    if let Some(canonical) = table.resolve(&paren_normalized) {
        let canonical = canonical.to_string();
        let aliases = if normalized_raw != canonical { vec![normalized_raw.to_string()] } else { vec![] };
        return (canonical, aliases);
    }

    if let Some(canonical) = table.resolve(normalized_raw) {
        let canonical = canonical.to_string();
        let aliases = if paren_normalized != canonical { vec![paren_content.trim().to_string()] } else { vec![] };
        return (canonical, aliases);
    }

    warnings.push(ParserWarning::ParenSynonymUnresolved);
    (normalized_raw.to_string(), vec![paren_content.trim().to_string()])
}

/// Build one [`DrugComponent`], resolving its canonical INN through the
/// synonym table (and any parenthetical synonym present).
pub fn build_drug_component(raw_inn_text: &str, paren_synonyms: &[String], table: &InnSynonymTable, warnings: &mut Vec<ParserWarning>) -> DrugComponent {
    let normalized_raw = normalize_inn_text(raw_inn_text);

    let (canonical_inn, aliases) = if let Some(first_paren) = paren_synonyms.first() {
        resolve_paren_synonym(first_paren, &normalized_raw, table, warnings)
    } else if let Some(canonical) = table.resolve(&normalized_raw) {
        let canonical = canonical.to_string();
        let aliases = if canonical != normalized_raw { vec![normalized_raw.clone()] } else { vec![] };
        (canonical, aliases)
    } else {
        warnings.push(ParserWarning::InnNotInSynonymTable);
        (normalized_raw.clone(), vec![])
    };

    DrugComponent {
        raw_inn: normalized_raw,
        canonical_inn,
        aliases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator_comma() {
        let mut w = vec![];
        assert_eq!(resolve_decimal("25,000", &mut w), 25000.0);
        assert!(w.is_empty());
    }

    #[test]
    fn decimal_comma() {
        let mut w = vec![];
        assert_eq!(resolve_decimal("37,5", &mut w), 37.5);
        assert!(w.is_empty());
    }

    #[test]
    fn ambiguous_four_digit_comma_warns() {
        let mut w = vec![];
        resolve_decimal("1,2345", &mut w);
        assert!(w.contains(&ParserWarning::AmbiguousDecimal));
    }

    #[test]
    fn multiple_commas_warn() {
        let mut w = vec![];
        resolve_decimal("1,2,3", &mut w);
        assert!(w.contains(&ParserWarning::AmbiguousDecimal));
    }

    #[test]
    fn inline_dose_parses_percent() {
        let units = UnitTable::new();
        let mut w = vec![];
        let conc = parse_inline_dose("2%", &units, &mut w).unwrap();
        assert_eq!(conc.value(), 2.0);
        assert_eq!(conc.encoding, ConcentrationEncoding::InlinePercent);
    }

    #[test]
    fn bracket_ratio_simplifies() {
        let units = UnitTable::new();
        let mut w = vec![];
        let conc = parse_bracket_concentration("100mg/5mL", &units, &mut w).unwrap();
        assert_eq!(conc.value(), 20.0);
        assert_eq!(conc.unit.canonical(), "mg/mL");
        assert_eq!(conc.encoding, ConcentrationEncoding::BracketRatio);
    }

    #[test]
    fn bracket_ratio_zero_denominator_is_unparseable() {
        let units = UnitTable::new();
        let mut w = vec![];
        assert!(parse_bracket_concentration("100mg/0mL", &units, &mut w).is_none());
        assert!(w.contains(&ParserWarning::UnparseableBracket));
    }

    #[test]
    fn bracket_simple_form() {
        let units = UnitTable::new();
        let mut w = vec![];
        let conc = parse_bracket_concentration("500mg", &units, &mut w).unwrap();
        assert_eq!(conc.value(), 500.0);
        assert_eq!(conc.encoding, ConcentrationEncoding::BracketSimple);
    }

    #[test]
    fn percent_vs_bracket_consistent_raises_no_warning() {
        let units = UnitTable::new();
        let mut w = vec![];
        let pct = parse_inline_dose("2%", &units, &mut w).unwrap();
        let bracket = parse_bracket_concentration("100mg/5mL", &units, &mut w).unwrap();
        validate_percent_vs_bracket(&pct, &bracket, &mut w);
        assert!(!w.contains(&ParserWarning::BracketRatioInconsistent));
    }

    #[test]
    fn percent_vs_bracket_inconsistent_warns() {
        let units = UnitTable::new();
        let mut w = vec![];
        let pct = parse_inline_dose("5%", &units, &mut w).unwrap();
        let bracket = parse_bracket_concentration("100mg/5mL", &units, &mut w).unwrap();
        validate_percent_vs_bracket(&pct, &bracket, &mut w);
        assert!(w.contains(&ParserWarning::BracketRatioInconsistent));
    }

    #[test]
    fn normalize_inn_strips_diacritics_and_salt_suffix() {
        assert_eq!(normalize_inn_text("tramadol clorhidrato"), "tramadol");
        assert_eq!(normalize_inn_text("codeína"), "codeina");
    }

    #[test]
    fn paren_synonym_promotes_recognized_paren_content() {
        let table = InnSynonymTable::new();
        let mut w = vec![];
        let (canonical, aliases) = resolve_paren_synonym("colecalciferol", "vitamina d3", &table, &mut w);
        assert_eq!(canonical, "colecalciferol");
        assert_eq!(aliases, vec!["vitamina d3".to_string()]);
        assert!(w.is_empty());
    }

    #[test]
    fn paren_synonym_falls_back_to_raw_when_neither_recognized() {
        let table = InnSynonymTable::new();
        let mut w = vec![];
        let (canonical, aliases) = resolve_paren_synonym("marca x", "principio activo nuevo", &table, &mut w);
        assert_eq!(canonical, "principio activo nuevo");
        assert_eq!(aliases, vec!["marca x".to_string()]);
        assert!(w.contains(&ParserWarning::ParenSynonymUnresolved));
    }

    #[test]
    fn build_component_without_parens_uses_direct_synonym_lookup() {
        let table = InnSynonymTable::new();
        let mut w = vec![];
        let comp = build_drug_component("paracetamol", &[], &table, &mut w);
        assert_eq!(comp.canonical_inn, "acetaminofen");
        assert_eq!(comp.aliases, vec!["paracetamol".to_string()]);
    }
}
