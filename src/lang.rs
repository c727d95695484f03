//! Language hints: script-based detection and display names.

use crate::config::Config;

/// Guess the language of `text` from its script.
///
/// Checks, in order: Hangul (`ko`), Arabic script (`fa`), CJK ideographs
/// (`zh`), Spanish diacritics and inverted punctuation (`es`). Anything
/// else is `en`. This is a hint for choosing a reply language, not a
/// classifier.
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().any(is_hangul) {
        "ko"
    } else if text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
        "fa"
    } else if text.chars().any(|c| ('\u{4E00}'..='\u{9FA5}').contains(&c)) {
        "zh"
    } else if text.chars().any(is_spanish_mark) {
        "es"
    } else {
        "en"
    }
}

fn is_hangul(c: char) -> bool {
    ('\u{3131}'..='\u{318E}').contains(&c) || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

fn is_spanish_mark(c: char) -> bool {
    matches!(
        c,
        'ñ' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ü' | '¿' | '¡' | 'Ñ' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'Ü'
    )
}

/// Display name for an ISO language code, as used in prompts.
pub fn language_name(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some("English"),
        "es" => Some("Spanish"),
        "zh" => Some("Chinese (Simplified)"),
        "zh-TW" => Some("Chinese (Traditional)"),
        "ko" => Some("Korean"),
        "fa" => Some("Persian"),
        "vi" => Some("Vietnamese"),
        _ => None,
    }
}

/// Locales offered to residents.
pub fn supported_locales(config: &Config) -> Vec<String> {
    config.locales.supported.clone()
}
