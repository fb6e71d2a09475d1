//! Arabic text normalization and gloss-token resolution.
//!
//! The token-to-clip map and its synonym table are the closed vocabulary the
//! Sign Video Assembler (C6) can render; a word absent from both is dropped
//! rather than rejected, matching the original's `_extract_gloss` filter.
//! Normalization is a pure, idempotent projection applied before lookup so
//! that orthographic variants (alef forms, ta marbuta/ha, diacritics)
//! collapse onto the same key.

use std::collections::HashMap;
use std::sync::LazyLock;

use thiserror::Error;

/// Canonical gloss token -> rendered clip file name.
static SIGN_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("اسعاف", "ambulance.mov"),
        ("نجده", "emergency.mov"),
        ("شرطه", "police.mov"),
        ("حادث", "accident.mov"),
        ("حريق", "fire.mov"),
        ("خطر", "danger.mov"),
        ("كهربا", "power_cut.mov"),
        ("قطع", "power_cut.mov"),
        ("مشكله", "big_problem.mov"),
        ("شبكه", "no_signal.mov"),
        ("مفيش", "no_signal.mov"),
    ])
});

/// Maps orthographic/lexical variants onto a [`SIGN_MAP`] key, or to `None`
/// for stop-words that resolve to nothing (dropped, not rejected).
static SYNONYM_MAP: LazyLock<HashMap<&'static str, Option<&'static str>>> = LazyLock::new(|| {
    HashMap::from([
        ("حرائق", Some("حريق")),
        ("نار", Some("حريق")),
        ("حريقه", Some("حريق")),
        ("إسعاف", Some("اسعاف")),
        ("سياره", Some("حادث")),
        ("حادثه", Some("حادث")),
        ("كبيره", Some("مشكله")),
        ("مشاكل", Some("مشكله")),
        ("لا", None),
        ("فقط", None),
        ("وصول", None),
    ])
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlossError {
    #[error("no gloss tokens resolved from input")]
    Empty,
}

/// Collapses alef/ta-marbuta/ya orthographic variants, strips tashkil
/// diacritics and tatweel, and trims whitespace. Idempotent: normalizing an
/// already-normalized string is a no-op.
#[must_use]
pub fn normalize_arabic(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            // Diacritics (tashkil) and tatweel are dropped entirely.
            '\u{064B}'..='\u{0652}' | '\u{0640}' => None,
            'أ' | 'إ' | 'آ' => Some('ا'),
            'ى' => Some('ي'),
            'ؤ' => Some('و'),
            'ئ' => Some('ي'),
            'ة' => Some('ه'),
            other => Some(other),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a single normalized word to a [`SIGN_MAP`] key, following the
/// synonym table one hop. Returns `None` for anything absent from both maps
/// (unknown words and stop-words alike) so it can be silently dropped.
fn resolve_word(word: &str) -> Option<&'static str> {
    if let Some((key, _)) = SIGN_MAP.get_key_value(word) {
        return Some(key);
    }
    match SYNONYM_MAP.get(word) {
        Some(Some(canonical)) => SIGN_MAP.get_key_value(canonical).map(|(key, _)| *key),
        Some(None) | None => None,
    }
}

/// Normalizes and tokenizes `text`, resolving every word to a canonical
/// gloss token. Words that don't resolve are dropped, not rejected. Fails
/// with [`GlossError::Empty`] only if nothing survives resolution.
pub fn resolve_tokens(text: &str) -> Result<Vec<&'static str>, GlossError> {
    let normalized = normalize_arabic(text);
    let tokens: Vec<&'static str> = normalized
        .split_whitespace()
        .filter_map(resolve_word)
        .collect();
    if tokens.is_empty() {
        return Err(GlossError::Empty);
    }
    Ok(tokens)
}

/// Looks up the rendered clip file name for a canonical gloss token.
#[must_use]
pub fn clip_for_token(token: &str) -> Option<&'static str> {
    SIGN_MAP.get(token).copied()
}
