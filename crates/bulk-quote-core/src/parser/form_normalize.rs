//! Layer 3 — pharmaceutical form normalization: map the raw form text
//! Layer 1 extracted to its canonical spelling and administration-route
//! group.

use crate::model::{FormGroup, ParserWarning};
use crate::tables::{strip_diacritics, FormTable};

/// Normalize `raw_form` (already lowercased by Layer 0) against the form
/// synonym table. Returns `(None, None)` when Layer 1 found no trailing
/// form at all. An unrecognized but present form is kept verbatim with
/// [`FormGroup::Other`] and a [`ParserWarning::FormNotRecognized`] —
/// the caller always gets something to display, never a hard failure.
pub fn normalize_form(raw_form: Option<&str>, table: &FormTable, warnings: &mut Vec<ParserWarning>) -> (Option<String>, Option<FormGroup>) {
    let raw_form = match raw_form {
        Some(f) => f,
        None => return (None, None),
    };

    let ascii = strip_diacritics(raw_form);
    let collapsed: String = ascii.split_whitespace().collect::<Vec<_>>().join(" ");

    match table.lookup(&collapsed) {
        Some((canonical, group)) => (Some(canonical), Some(group)),
        None => {
            warnings.push(ParserWarning::FormNotRecognized);
            (Some(raw_form.to_string()), Some(FormGroup::Other))
        }
    }
}
