//! Layer 1 — structural segmentation: bracket/paren extraction, trailing
//! pharmaceutical form detection, `+`-combo splitting, and per-segment
//! INN/dose separation. Operates on Layer 0's sanitized output and does
//! not itself resolve any value or synonym — that is Layers 2 and 3.

use crate::tables::UnitTable;

/// One `+`-separated piece of the input, split into its INN text and
/// (if an inline dose token was found) its raw dose text.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseSegment {
    pub inn_text: String,
    pub dose_text: Option<String>,
}

/// Everything Layer 1 extracts from one sanitized input string.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Contents of every `[...]` block, in order of appearance.
    pub bracket_contents: Vec<String>,
    /// Contents of every `(...)` block, in order of appearance.
    pub paren_contents: Vec<String>,
    pub raw_form: Option<String>,
    pub segments: Vec<DoseSegment>,
    /// The text remaining after delimiter and form extraction, before the
    /// `+`-split — the fallback INN text when every segment's INN text
    /// turns out empty (e.g. a bare dose like `"500mg"` with no name).
    pub after_form: String,
}

/// Run Layer 1 over an already-sanitized string (see [`crate::parser::sanitize`]).
pub fn segment(sanitized: &str, units: &UnitTable, known_forms: &[&str]) -> Segmentation {
    let blocks = extract_delimited_blocks(sanitized);
    let (after_form, raw_form) = extract_trailing_form(&blocks.cleaned, known_forms);

    let mut plus_segments = split_on_plus_outside_delimiters(&after_form);
    if plus_segments.is_empty() {
        plus_segments.push(after_form.clone());
    }

    let segments = plus_segments.iter().map(|seg| split_inn_and_dose(seg, units)).collect();

    Segmentation {
        bracket_contents: blocks.brackets,
        paren_contents: blocks.parens,
        raw_form,
        segments,
        after_form,
    }
}

struct DelimitedBlocks {
    cleaned: String,
    brackets: Vec<String>,
    parens: Vec<String>,
}

/// Extract every `[...]` and every `(...)` span from `text` (non-nesting —
/// the first matching close character ends the block, mirroring the
/// original `[^\]]*`/`[^)]*` regex classes), then remove all matched spans
/// and collapse the resulting whitespace.
fn extract_delimited_blocks(text: &str) -> DelimitedBlocks {
    let bracket_spans = find_spans(text, '[', ']');
    let paren_spans = find_spans(text, '(', ')');

    let mut all_spans: Vec<(usize, usize)> =
        bracket_spans.iter().map(|(s, e, _)| (*s, *e)).chain(paren_spans.iter().map(|(s, e, _)| (*s, *e))).collect();
    all_spans.sort_unstable();

    let mut cleaned = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in &all_spans {
        cleaned.push_str(&text[last..*start]);
        cleaned.push(' ');
        last = *end;
    }
    cleaned.push_str(&text[last..]);

    DelimitedBlocks {
        cleaned: collapse_whitespace(&cleaned),
        brackets: bracket_spans.into_iter().map(|(_, _, c)| c).collect(),
        parens: paren_spans.into_iter().map(|(_, _, c)| c).collect(),
    }
}

/// Find every `open ... close` span in `text`, returning `(start_byte,
/// end_byte, trimmed_content)` in order of appearance.
fn find_spans(text: &str, open: char, close: char) -> Vec<(usize, usize, String)> {
    let indices: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < indices.len() {
        let (start_byte, c) = indices[i];
        if c == open {
            if let Some(j) = (i + 1..indices.len()).find(|&j| indices[j].1 == close) {
                let content_start = indices[i + 1].0;
                let (close_byte, _) = indices[j];
                let content = text[content_start..close_byte].trim().to_string();
                let end_byte = close_byte + close.len_utf8();
                spans.push((start_byte, end_byte, content));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    spans
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

/// Right-anchored greedy search for a known pharmaceutical form. `forms`
/// must already be sorted longest-first (see
/// [`crate::tables::FormTable::spellings_longest_first`]) so a longer form
/// is never truncated to a shorter false match (`"solucion inyectable"`
/// must win over `"solucion"`).
fn extract_trailing_form(text: &str, forms: &[&str]) -> (String, Option<String>) {
    let trimmed = text.trim_end();
    for form in forms {
        if trimmed.ends_with(form) {
            let cut = trimmed.len() - form.len();
            let remaining = text[..cut].trim().to_string();
            return (remaining, Some((*form).to_string()));
        }
    }
    (text.trim().to_string(), None)
}

/// Split `text` on `+`, ignoring any `+` nested inside `[...]`/`(...)`.
/// By the time this runs the sanitized text's brackets/parens have
/// already been extracted and removed, but depth tracking is kept so a
/// malformed or not-yet-stripped delimiter never causes an errant split.
fn split_on_plus_outside_delimiters(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = (depth - 1).max(0);
                current.push(c);
            }
            '+' if depth == 0 => {
                segments.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let tail = current.trim().to_string();
    if !tail.is_empty() {
        segments.push(tail);
    }
    segments.into_iter().filter(|s| !s.is_empty()).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_unit_char(c: char) -> bool {
    c.is_alphabetic() || c == '%' || c == '/'
}

/// Locate the first inline dose token: a decimal number (possibly with a
/// thousands or decimal comma, resolved later in Layer 2) immediately
/// followed, after optional whitespace, by a recognized unit spelling that
/// is not itself followed by a word character. Tries the longest possible
/// unit run first so a compound spelling (`ui/ml`) wins over its simple
/// prefix (`ui`). Returns the char index the dose token starts at.
fn find_inline_dose_start(segment: &str, units: &UnitTable) -> Option<usize> {
    let chars: Vec<char> = segment.chars().collect();
    let n = chars.len();
    let mut i = 0;
    while i < n {
        if chars[i].is_ascii_digit() {
            let num_start = i;
            let mut j = i;
            while j < n && (chars[j].is_ascii_digit() || ((chars[j] == '.' || chars[j] == ',') && j + 1 < n && chars[j + 1].is_ascii_digit())) {
                j += 1;
            }
            let mut k = j;
            while k < n && chars[k] == ' ' {
                k += 1;
            }
            let unit_start = k;
            let mut u = k;
            while u < n && is_unit_char(chars[u]) {
                u += 1;
            }
            let unit_end = u;

            let mut cut = unit_end;
            while cut > unit_start {
                let candidate: String = chars[unit_start..cut].iter().collect();
                if units.canonicalize(&candidate).is_some() {
                    let next_is_word = chars.get(cut).map(|c| is_word_char(*c)).unwrap_or(false);
                    if !next_is_word {
                        return Some(num_start);
                    }
                }
                cut -= 1;
            }
            i = num_start + 1;
        } else {
            i += 1;
        }
    }
    None
}

/// Within one `+`-segment, split the INN text (left) from the raw dose
/// string (right) at the first inline dose token. A segment with no
/// recognizable dose token becomes pure INN text with `dose_text: None`.
fn split_inn_and_dose(segment: &str, units: &UnitTable) -> DoseSegment {
    match find_inline_dose_start(segment, units) {
        Some(start) => {
            let chars: Vec<char> = segment.chars().collect();
            let inn: String = chars[..start].iter().collect();
            let dose: String = chars[start..].iter().collect();
            DoseSegment {
                inn_text: inn.trim().to_string(),
                dose_text: Some(dose.trim().to_string()),
            }
        }
        None => DoseSegment {
            inn_text: segment.trim().to_string(),
            dose_text: None,
        },
    }
}
