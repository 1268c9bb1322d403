use crate::core::code::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;

static LETTER_THEN_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z])(\d)").expect("Failed to compile letter/digit regex"));
static DIGIT_THEN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)([A-Za-z])").expect("Failed to compile digit/letter regex"));
static LETTER_SPACE_DIGIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z])\s+(\d)").expect("Failed to compile letter-space-digit regex")
});
static DIGIT_SPACE_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d)\s+([A-Za-z])").expect("Failed to compile digit-space-letter regex")
});

/// "CS156"、"CS 156"、"CS/156" 等寫法，原文排第一，不改大小寫
pub fn generate_variants(code: &str) -> Vec<String> {
    if code.trim().is_empty() {
        return Vec::new();
    }

    let normalized = collapse_whitespace(code);
    let spaced = DIGIT_THEN_LETTER
        .replace_all(&LETTER_THEN_DIGIT.replace_all(&normalized, "$1 $2"), "$1 $2")
        .into_owned();
    let joined = DIGIT_SPACE_LETTER
        .replace_all(&LETTER_SPACE_DIGIT.replace_all(&normalized, "$1$2"), "$1$2")
        .into_owned();

    let candidates = [
        code.to_string(),
        normalized.clone(),
        normalized.replace(' ', "/"),
        normalized.replace('/', " "),
        normalized.chars().filter(|c| !c.is_whitespace()).collect(),
        spaced,
        joined,
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}
