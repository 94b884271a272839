//! Narration-safe text cleanup.

/// Punctuation the narration service reads as pauses or intonation.
const SENTENCE_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '¿', '¡', '\'', '"', '(', ')', '-',
];

/// Accented letters of the Spanish alphabet, always kept.
const LOCALE_LETTERS: &[char] = &[
    'á', 'é', 'í', 'ó', 'ú', 'ü', 'ñ', 'Á', 'É', 'Í', 'Ó', 'Ú', 'Ü', 'Ñ',
];

/// Dialogue dashes, spoken as a short pause.
const DASHES: &[char] = &['\u{2014}', '\u{2013}'];

/// Clean chapter text for narration.
///
/// This function:
/// - Collapses runs of 3+ newlines to a paragraph break
/// - Replaces em and en dashes with ", "
/// - Replaces every other unspeakable character with a space
/// - Collapses repeated spaces and trims the result
///
/// Idempotent: cleaning already-clean text returns it unchanged.
pub fn sanitize(text: &str) -> String {
    let text = collapse_newlines(text);
    let text = replace_unspeakable(&text);
    let text = collapse_spaces(&text);
    text.trim().to_string()
}

/// Check if a character survives sanitization as-is.
fn is_speakable(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || SENTENCE_PUNCTUATION.contains(&c)
        || LOCALE_LETTERS.contains(&c)
}

fn collapse_newlines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newline_count = 0;

    for c in text.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    result
}

fn replace_unspeakable(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if DASHES.contains(&c) {
            result.push_str(", ");
        } else if is_speakable(c) {
            result.push(c);
        } else {
            result.push(' ');
        }
    }

    result
}

fn collapse_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = false;

    for c in text.chars() {
        if c == ' ' {
            if !prev_was_space {
                result.push(' ');
            }
            prev_was_space = true;
        } else {
            prev_was_space = false;
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_em_dash() {
        assert_eq!(sanitize("a—b"), "a, b");
    }

    #[test]
    fn test_dialogue_dashes() {
        assert_eq!(
            sanitize("—Hola —dijo Juan– y se fue."),
            ", Hola , dijo Juan, y se fue."
        );
    }

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(sanitize("Uno\n\n\n\n\nDos"), "Uno\n\nDos");
        assert_eq!(sanitize("Uno\n\nDos"), "Uno\n\nDos");
    }

    #[test]
    fn test_strips_symbols() {
        assert_eq!(sanitize("«Hola» 😀 mundo #1 & *todo*"), "Hola mundo 1 todo");
    }

    #[test]
    fn test_keeps_spanish_punctuation_and_letters() {
        let text = "¿Qué pasó? ¡Ñandú! (Sí, \"pingüino\"); fin: 'ok'-";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn test_collapse_spaces_only() {
        assert_eq!(sanitize("  a    b\t\tc  "), "a b\t\tc");
    }

    #[test]
    fn test_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("★☆★"), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(text in "\\PC{0,200}") {
            let once = sanitize(&text);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn prop_idempotent_on_messy_text(text in "[a-zñé—–\n \t«»😀.,¿?#]{0,200}") {
            let once = sanitize(&text);
            prop_assert_eq!(sanitize(&once), once.clone());
            prop_assert!(!once.contains('—'));
            prop_assert!(!once.contains("\n\n\n"));
            prop_assert!(!once.contains("  "));
        }
    }
}
