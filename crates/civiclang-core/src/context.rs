//! Prompt-ready renderings of ranked results.
//!
//! Three forms, all pure functions of the ranked sequence:
//!
//! | Function | Output | Used for |
//! |----------|--------|----------|
//! | [`render_bullets`] | `- (<source>) <text>` per line | single-shot prompts |
//! | [`render_labeled`] | `[#<rank> <source>]\n<snippet>` blocks | conversational prompts with citations |
//! | [`render_labels`] | `[#<rank> <source>]` | UI-side citation lists |
//!
//! An empty result sequence renders as an empty string (or an empty label
//! list), so callers can embed the output unconditionally.

use std::borrow::Cow;

use crate::models::ScoredResult;

/// Maximum characters of document text per labeled block.
pub const SNIPPET_LIMIT: usize = 1200;

/// Appended to labeled snippets that were cut at [`SNIPPET_LIMIT`].
pub const SNIPPET_MARKER: &str = " …";

/// One bullet per result, in rank order.
pub fn render_bullets(results: &[ScoredResult<'_>]) -> String {
    results
        .iter()
        .map(|r| format!("- ({}) {}", r.document.source, r.document.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Citation-numbered blocks separated by a blank line.
///
/// ```text
/// [#1 ocvote]
/// Ballot Drop Boxes — https://ocvote.gov/...
///
/// ...snippet text...
///
/// [#2 iusd]
/// Enrollment Requirements — https://iusd.org/...
/// ```
pub fn render_labeled(results: &[ScoredResult<'_>]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "{}\n{}",
                r.label(),
                truncate_chars(&r.document.text, SNIPPET_LIMIT, SNIPPET_MARKER)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Citation labels only, in rank order.
pub fn render_labels(results: &[ScoredResult<'_>]) -> Vec<String> {
    results.iter().map(ScoredResult::label).collect()
}

/// Cut `text` to at most `limit` characters, appending `marker` when cut.
///
/// Text already within the limit is returned unchanged (borrowed).
/// Limits count Unicode scalar values, never splitting a character.
pub fn truncate_chars<'a>(text: &'a str, limit: usize, marker: &str) -> Cow<'a, str> {
    match text.char_indices().nth(limit) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + marker.len());
            out.push_str(&text[..cut]);
            out.push_str(marker);
            Cow::Owned(out)
        }
    }
}
