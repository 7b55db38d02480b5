//! Layer 0 — sanitization: Unicode NFC composition, whitespace trimming
//! and collapsing, lowercasing. The load-bearing characters
//! `% [ ] ( ) + /` are never touched.

/// Compose combining-character sequences into their precomposed form
/// (e.g. `e` + combining-acute → `é`) without a full Unicode-normalization
/// crate: the input alphabet is Spanish pharmaceutical free text, whose
/// only combining marks are the acute accent and the tilde, so a direct
/// two-codepoint table covers every case this crate needs to handle.
fn compose_nfc(s: &str) -> String {
    const COMBINING_ACUTE: char = '\u{0301}';
    const COMBINING_TILDE: char = '\u{0303}';

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(&next) = chars.peek() {
            if next == COMBINING_ACUTE {
                if let Some(composed) = compose_acute(c) {
                    out.push(composed);
                    chars.next();
                    continue;
                }
            } else if next == COMBINING_TILDE {
                if let Some(composed) = compose_tilde(c) {
                    out.push(composed);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn compose_acute(c: char) -> Option<char> {
    Some(match c {
        'a' => 'á',
        'e' => 'é',
        'i' => 'í',
        'o' => 'ó',
        'u' => 'ú',
        'A' => 'Á',
        'E' => 'É',
        'I' => 'Í',
        'O' => 'Ó',
        'U' => 'Ú',
        _ => return None,
    })
}

fn compose_tilde(c: char) -> Option<char> {
    Some(match c {
        'n' => 'ñ',
        'N' => 'Ñ',
        _ => return None,
    })
}

/// Normalize to a canonical composed form, strip surrounding whitespace,
/// lowercase, and collapse internal whitespace runs to single spaces.
/// Preserves `% [ ] ( ) + /` exactly.
pub fn sanitize(raw: &str) -> String {
    let composed = compose_nfc(raw);
    let lowered = composed.to_lowercase();
    let trimmed = lowered.trim();

    let mut out = String::with_capacity(trimmed.len());
    let mut last_was_space = false;
    for c in trimmed.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_lowercases() {
        assert_eq!(sanitize("  Acetaminofen   325mg  "), "acetaminofen 325mg");
    }

    #[test]
    fn preserves_load_bearing_characters() {
        let input = "Abacavir 2% [100mg/5mL] + Codeina (paracetamol)";
        let sanitized = sanitize(input);
        for c in ['%', '[', ']', '(', ')', '+', '/'] {
            assert!(sanitized.contains(c), "missing {c}");
        }
    }

    #[test]
    fn is_idempotent() {
        let once = sanitize("  Solución   Oral  ");
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn composes_decomposed_accents() {
        // 'o' + combining acute accent (U+0301)
        let decomposed = "solucio\u{0301}n";
        assert_eq!(sanitize(decomposed), "solución");
    }
}
