//! Sentence-level text cleanup shared by every pipeline stage.

use unicode_normalization::UnicodeNormalization;

use crate::ErrorSignal;

/// Caption artifacts stripped from every sentence
const NOISE_MARKERS: [&str; 5] = ["[music]", "[Music]", "\n", "<<", ">>"];

/// Typographic apostrophes that the ASCII fold would otherwise drop
const CURLY_APOSTROPHES: [char; 3] = ['\u{2018}', '\u{2019}', '\u{02BC}'];

/// Normalize raw transcript or summary text.
///
/// Error signals are poison values: input equal to one of the fixed display
/// strings is returned unchanged. Everything else is folded to ASCII via
/// NFKD, sentence-tokenized, stripped of caption noise, capitalized per
/// sentence, and rejoined with single spaces.
///
/// The fold runs before sentence splitting: compatibility characters can
/// decompose into sentence terminators (an ellipsis becomes three periods),
/// and every pass must see the same boundaries.
///
/// Idempotent: `clean(clean(x)) == clean(x)`.
pub fn clean(text: &str) -> String {
    if ErrorSignal::is_poison(text) {
        return text.to_string();
    }

    // Restore curly apostrophes before the ASCII fold mangles them
    let text: String = text
        .chars()
        .map(|c| if CURLY_APOSTROPHES.contains(&c) { '\'' } else { c })
        .collect();

    // Canonical decomposition, then drop any non-ASCII remainder
    let folded: String = text.nfkd().filter(char::is_ascii).collect();

    split_sentences(&folded)
        .into_iter()
        .map(|sentence| {
            let mut sentence = sentence;
            for marker in NOISE_MARKERS {
                sentence = sentence.replace(marker, "");
            }
            capitalize(sentence.trim())
        })
        .filter(|sentence| !sentence.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into sentences on terminal punctuation.
///
/// Runs of closing punctuation ("great!!") stay attached to their sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    const ENDERS: [char; 3] = ['.', '!', '?'];

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if ENDERS.contains(&ch) && !chars.peek().is_some_and(|next| ENDERS.contains(next)) {
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let remainder = current.trim().to_string();
    if !remainder.is_empty() {
        sentences.push(remainder);
    }

    sentences
}

/// Uppercase the first character of a sentence
pub fn capitalize(sentence: &str) -> String {
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
