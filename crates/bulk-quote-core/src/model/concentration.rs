//! Normalized concentration value object and the Hard Barrier equality check.

use serde::{Deserialize, Serialize};

/// How a concentration was spelled in the source text, in priority order
/// (highest first) when a `ParsedDrug` carries more than one candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConcentrationEncoding {
    BracketRatio,
    Inline,
    BracketSimple,
    InlinePercent,
}

/// An immutable dose/concentration value with a canonical unit spelling.
///
/// `value` is stored as an integer numerator over a fixed decimal scale
/// (`SCALE`) rather than `f64`, so equality — the Hard Barrier the matcher
/// depends on — is never subject to floating-point rounding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalizedConcentration {
    /// Fixed-point numerator; actual value is `raw_value / SCALE`.
    raw_value: i64,
    pub unit: Unit,
    pub encoding: ConcentrationEncoding,
}

/// Decimal places kept for every concentration value (covers the finest
/// granularity observed in the catalog: micrograms-per-mL ratios).
pub const SCALE_EXPONENT: u32 = 4;
const SCALE: f64 = 10_000.0;

impl NormalizedConcentration {
    pub fn from_f64(value: f64, unit: Unit, encoding: ConcentrationEncoding) -> Self {
        Self {
            raw_value: (value * SCALE).round() as i64,
            unit,
            encoding,
        }
    }

    pub fn value(&self) -> f64 {
        self.raw_value as f64 / SCALE
    }

    /// The Hard Barrier: exact value equality, case-insensitive unit
    /// equality. No tolerance, no unit conversion.
    pub fn matches(&self, other: &NormalizedConcentration) -> bool {
        self.raw_value == other.raw_value && self.unit.matches(&other.unit)
    }
}

impl PartialEq for NormalizedConcentration {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

/// A canonical unit spelling. Compound units are stored as `Compound`
/// carrying the already-canonicalized numerator/denominator pair so
/// `canonical()` never needs to re-derive the slash form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Unit {
    Mg,
    G,
    Mcg,
    Kg,
    Ml,
    L,
    Dl,
    Iu,
    MIu,
    MEq,
    Mmol,
    Percent,
    Compound(Box<Unit>, Box<Unit>),
    /// Unrecognized unit spelling, preserved verbatim so downstream code
    /// can still display it; never matches any other unit.
    Other(String),
}

impl Unit {
    pub fn canonical(&self) -> String {
        match self {
            Unit::Mg => "mg".to_string(),
            Unit::G => "g".to_string(),
            Unit::Mcg => "mcg".to_string(),
            Unit::Kg => "kg".to_string(),
            Unit::Ml => "mL".to_string(),
            Unit::L => "L".to_string(),
            Unit::Dl => "dL".to_string(),
            Unit::Iu => "IU".to_string(),
            Unit::MIu => "mIU".to_string(),
            Unit::MEq => "mEq".to_string(),
            Unit::Mmol => "mmol".to_string(),
            Unit::Percent => "%".to_string(),
            Unit::Compound(num, den) => format!("{}/{}", num.canonical(), den.canonical()),
            Unit::Other(s) => s.clone(),
        }
    }

    /// Case-insensitive canonical-spelling equality — except `Other`, which
    /// never matches anything, including another `Other` with identical
    /// text: an unrecognized spelling is never known to mean the same
    /// thing as another unrecognized spelling.
    pub fn matches(&self, other: &Unit) -> bool {
        if matches!(self, Unit::Other(_)) || matches!(other, Unit::Other(_)) {
            return false;
        }
        self.canonical().eq_ignore_ascii_case(&other.canonical())
    }
}
