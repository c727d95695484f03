//! Keyword-overlap relevance scoring.
//!
//! # Algorithm
//!
//! 1. Lower-case the query and split it on runs of non-word characters
//!    (word characters are ASCII letters, digits, and `_`).
//! 2. Drop empty tokens. Repeated tokens are kept.
//! 3. The score is the number of tokens that occur as a substring of the
//!    lower-cased document text.
//!
//! Matching is plain substring containment, so `"vote"` matches inside
//! `"voter"`. There is no stemming, synonym expansion, or stop-word removal.

/// Tokenize a query into lower-cased terms.
///
/// ```rust
/// use civiclang_core::score::tokenize;
///
/// assert_eq!(tokenize("Missed trash-pickup?"), vec!["missed", "trash", "pickup"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score `text` against `query`.
pub fn score(query: &str, text: &str) -> usize {
    score_tokens(&tokenize(query), &text.to_lowercase())
}

/// Score pre-tokenized query terms against already lower-cased text.
pub fn score_tokens<S: AsRef<str>>(tokens: &[S], lowered_text: &str) -> usize {
    tokens
        .iter()
        .filter(|t| lowered_text.contains(t.as_ref()))
        .count()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_matching_term() {
        assert_eq!(
            score("missed trash pickup", "Trash pickup missed? Contact Public Works."),
            3
        );
        assert_eq!(score("missed trash pickup", "Library hours are 9-5."), 0);
    }

    #[test]
    fn repeated_query_terms_count_per_occurrence() {
        assert_eq!(score("vote vote", "Where do I vote?"), 2);
        assert_eq!(score("vote ballot", "Where do I vote?"), 1);
    }

    #[test]
    fn repeated_document_occurrences_count_once() {
        assert_eq!(score("park", "park park park"), 1);
    }

    #[test]
    fn substring_matches_are_accepted() {
        // "vote" inside "voters" still counts.
        assert_eq!(score("vote", "Information for registered voters"), 1);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(score("IUSD", "iusd: Irvine Unified School District"), 1);
        assert_eq!(score("iusd", "IUSD: Irvine Unified School District"), 1);
    }

    #[test]
    fn empty_and_punctuation_only_queries_score_zero() {
        assert_eq!(score("", "anything at all"), 0);
        assert_eq!(score("   \t\n", "anything at all"), 0);
        assert_eq!(score("?!--", "anything at all"), 0);
    }

    #[test]
    fn non_ascii_letters_split_tokens() {
        assert_eq!(tokenize("café hours"), vec!["caf", "hours"]);
        assert!(tokenize("쓰레기").is_empty());
    }

    #[test]
    fn underscores_and_digits_are_word_chars() {
        assert_eq!(tokenize("data_ca_gov 2024"), vec!["data_ca_gov", "2024"]);
    }

    #[test]
    fn monotonic_in_matching_terms() {
        let both = score("ballot drop", "ballot drop box");
        let one = score("ballot drop", "ballot envelope");
        let none = score("ballot drop", "library card");
        assert!(both >= one);
        assert!(one >= none);
        assert_eq!(none, 0);
    }
}
