//! Static, version-controlled lookup tables: unit canonicalization, INN
//! synonyms (plus the salt/qualifier suffix list), and form synonyms with
//! their administration-route group.
//!
//! These tables determine the system's correctness more than any other
//! module in the crate — reviewers must be able to diff them per release,
//! so each default table is a single literal list rather than anything
//! generated or loaded at runtime.

use std::collections::HashMap;

use crate::model::{FormGroup, Unit};

/// Salt/qualifier suffixes stripped from INN text before synonym-table
/// lookup, curated from the upstream catalog's naming conventions.
/// Word-boundary, case-insensitive. Kept as a single literal list so a
/// reviewer can diff additions/removals per release.
pub const SALT_SUFFIXES: &[&str] = &[
    "clorhidrato",
    "hidrocloruro",
    "sodico",
    "potasico",
    "calcico",
    "acetato",
    "fosfato",
    "sulfato",
    "bromuro",
    "maleato",
    "fumarato",
    "tartrato",
    "base",
];

/// Strip diacritics from Latin letters (áéíóúñü → aeiounu) without pulling
/// in a normalization crate: the input alphabet here is fixed (Spanish
/// pharmaceutical text), so a direct character map is simpler and faster
/// than full Unicode decomposition.
pub fn strip_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Strip a trailing salt/qualifier suffix (see [`SALT_SUFFIXES`]) from an
/// already lowercased, diacritic-stripped INN token, at a word boundary.
pub fn strip_salt_suffix(inn: &str) -> String {
    let trimmed = inn.trim();
    for suffix in SALT_SUFFIXES {
        if let Some(prefix) = trimmed.strip_suffix(suffix) {
            let prefix = prefix.trim_end();
            if !prefix.is_empty() && prefix.len() < trimmed.len() {
                return prefix.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Unit canonical map. Compound units (`mg/mL`) are resolved by splitting
/// on `/` and canonicalizing each side, so the simple-unit map alone
/// covers every compound combination without extra entries.
pub struct UnitTable {
    simple: HashMap<String, Unit>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTable {
    pub fn new() -> Self {
        Self {
            simple: Self::default_units(),
        }
    }

    /// Canonicalize a unit spelling, case-insensitive. Compound forms
    /// (containing `/`) must have both sides recognized or the whole
    /// lookup fails — a half-known compound unit is not simplified to a
    /// guess.
    pub fn canonicalize(&self, raw: &str) -> Option<Unit> {
        let lower = raw.to_lowercase();
        if let Some(slash) = lower.find('/') {
            let (num, den) = (&lower[..slash], &lower[slash + 1..]);
            let num_unit = self.simple.get(num)?.clone();
            let den_unit = self.simple.get(den)?.clone();
            return Some(Unit::Compound(Box::new(num_unit), Box::new(den_unit)));
        }
        self.simple.get(&lower).cloned()
    }

    pub fn add_unit(&mut self, spelling: &str, unit: Unit) {
        self.simple.insert(spelling.to_lowercase(), unit);
    }

    fn default_units() -> HashMap<String, Unit> {
        let mut map = HashMap::new();

        map.insert("mg".into(), Unit::Mg);
        map.insert("miligramo".into(), Unit::Mg);
        map.insert("miligramos".into(), Unit::Mg);

        map.insert("g".into(), Unit::G);
        map.insert("gr".into(), Unit::G);
        map.insert("gramo".into(), Unit::G);
        map.insert("gramos".into(), Unit::G);

        map.insert("mcg".into(), Unit::Mcg);
        map.insert("microgramo".into(), Unit::Mcg);
        map.insert("microgramos".into(), Unit::Mcg);
        map.insert("ug".into(), Unit::Mcg);

        map.insert("kg".into(), Unit::Kg);
        map.insert("kilogramo".into(), Unit::Kg);
        map.insert("kilogramos".into(), Unit::Kg);

        map.insert("ml".into(), Unit::Ml);
        map.insert("mililitro".into(), Unit::Ml);
        map.insert("mililitros".into(), Unit::Ml);

        map.insert("l".into(), Unit::L);
        map.insert("litro".into(), Unit::L);
        map.insert("litros".into(), Unit::L);

        map.insert("dl".into(), Unit::Dl);
        map.insert("decilitro".into(), Unit::Dl);
        map.insert("decilitros".into(), Unit::Dl);

        map.insert("ui".into(), Unit::Iu);
        map.insert("iu".into(), Unit::Iu);
        map.insert("u".into(), Unit::Iu);

        map.insert("miu".into(), Unit::MIu);
        map.insert("mui".into(), Unit::MIu);

        map.insert("meq".into(), Unit::MEq);
        map.insert("mmol".into(), Unit::Mmol);
        map.insert("%".into(), Unit::Percent);

        map
    }
}

/// INN (canonical active ingredient name) synonym table.
pub struct InnSynonymTable {
    synonyms: HashMap<String, String>,
}

impl Default for InnSynonymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InnSynonymTable {
    pub fn new() -> Self {
        Self {
            synonyms: Self::default_synonyms(),
        }
    }

    /// Resolve `raw` (already lowercased, diacritic-stripped, salt-suffix
    /// stripped by the caller) to its catalog-spelling INN. Returns
    /// `None` when no mapping exists — the caller falls back to
    /// `raw == canonical` and emits `INN_NOT_IN_SYNONYM_TABLE`.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.synonyms.get(raw).map(|s| s.as_str())
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.synonyms.contains_key(raw)
    }

    pub fn add_synonym(&mut self, source: &str, canonical: &str) {
        self.synonyms.insert(source.to_lowercase(), canonical.to_lowercase());
    }

    fn default_synonyms() -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("paracetamol".into(), "acetaminofen".into());
        map.insert("vitamina d3".into(), "colecalciferol".into());
        map.insert("vitamina c".into(), "acido ascorbico".into());
        map.insert("vitamina b12".into(), "cianocobalamina".into());
        map.insert("vitamina b1".into(), "tiamina".into());
        map.insert("acido acetilsalicilico".into(), "aspirina".into());
        map.insert("dipirona".into(), "metamizol".into());
        map.insert("dipirona sodica".into(), "metamizol".into());
        map.insert("buscapina".into(), "butilhioscina".into());
        map.insert("hioscina".into(), "butilhioscina".into());
        map.insert("salbutamol".into(), "albuterol".into());
        map.insert("epinefrina".into(), "adrenalina".into());
        map.insert("norepinefrina".into(), "noradrenalina".into());

        map
    }
}

/// Form synonym table: canonical form name → administration group.
pub struct FormTable {
    /// Lowercase raw spelling → (canonical form name, form group). Kept
    /// as a flat map so a reviewer can add a new spelling of an existing
    /// form without touching the group logic.
    forms: HashMap<String, (String, FormGroup)>,
}

impl Default for FormTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FormTable {
    pub fn new() -> Self {
        Self {
            forms: Self::default_forms(),
        }
    }

    pub fn lookup(&self, raw: &str) -> Option<(String, FormGroup)> {
        self.forms.get(&raw.to_lowercase()).cloned()
    }

    /// Every recognized spelling, longest first — Layer 1's right-anchored
    /// form-stripping step must try longer forms (`"solucion inyectable"`)
    /// before shorter ones (`"solucion"`) so a longer form is never
    /// truncated to a shorter false match.
    pub fn spellings_longest_first(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.forms.keys().map(|s| s.as_str()).collect();
        v.sort_by_key(|s| std::cmp::Reverse(s.len()));
        v
    }

    pub fn add_form(&mut self, spelling: &str, canonical: &str, group: FormGroup) {
        self.forms
            .insert(spelling.to_lowercase(), (canonical.to_lowercase(), group));
    }

    fn default_forms() -> HashMap<String, (String, FormGroup)> {
        let mut map = HashMap::new();
        let mut insert = |spellings: &[&str], canonical: &str, group: FormGroup| {
            for s in spellings {
                map.insert(s.to_string(), (canonical.to_string(), group));
            }
        };

        insert(&["tableta", "tabletas", "comprimido", "comprimidos"], "tableta", FormGroup::OralSolid);
        insert(&["capsula", "capsulas", "capsula blanda", "capsulas blandas"], "capsula", FormGroup::OralSolid);
        insert(&["tableta recubierta", "gragea", "grageas"], "tableta recubierta", FormGroup::OralSolid);

        insert(
            &["solucion oral", "jarabe", "suspension oral", "elixir"],
            "solucion oral",
            FormGroup::OralLiquid,
        );

        insert(
            &["solucion inyectable", "inyectable", "ampolla", "ampollas"],
            "solucion inyectable",
            FormGroup::Injectable,
        );

        // "unguento" is listed both with and without its diaeresis: Layer 1's
        // trailing-form search runs before Layer 3 strips diacritics, so a
        // form spelled "ungüento" in the source text needs its own entry here.
        insert(&["crema", "pomada", "unguento", "ungüento", "gel topico"], "crema", FormGroup::Topical);
        insert(
            &["solucion oftalmica", "gotas oftalmicas", "colirio"],
            "solucion oftalmica",
            FormGroup::Ophthalmic,
        );
        insert(&["inhalador", "aerosol", "solucion para inhalacion"], "inhalador", FormGroup::Inhalation);
        insert(&["supositorio", "supositorios", "ovulo", "ovulos"], "supositorio", FormGroup::RectalVaginal);

        map
    }
}
