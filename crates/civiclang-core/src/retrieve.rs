//! Ranked retrieval over a [`Corpus`].
//!
//! # Ranking
//!
//! 1. Score every document with [`score_tokens`](crate::score::score_tokens).
//! 2. Keep documents with a score strictly greater than zero.
//! 3. Sort by score, descending. The sort is stable, so ties keep corpus order.
//! 4. Truncate to `k` and assign 1-based ranks.
//!
//! An empty result is the normal "no local knowledge" outcome, not an error.

use crate::context::{render_bullets, render_labeled, render_labels};
use crate::corpus::Corpus;
use crate::models::ScoredResult;
use crate::score::{score_tokens, tokenize};

/// Result count for single-shot bullet context.
pub const DEFAULT_BULLET_K: usize = 5;

/// Result count for conversational labeled context.
pub const DEFAULT_CHAT_K: usize = 3;

/// Read-only retriever borrowing a corpus.
///
/// Retrieval never mutates shared state; any number of retrievers may read
/// the same corpus concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'c> {
    corpus: &'c Corpus,
}

impl<'c> Retriever<'c> {
    pub fn new(corpus: &'c Corpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    /// Return at most `k` positively scored documents, best first.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<ScoredResult<'c>> {
        let tokens = tokenize(query);
        if tokens.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<ScoredResult<'c>> = self
            .corpus
            .iter()
            .filter_map(|doc| {
                let score = score_tokens(&tokens, &doc.text.to_lowercase());
                (score > 0).then_some(ScoredResult {
                    document: doc,
                    score,
                    rank: 0,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(k);
        for (i, hit) in hits.iter_mut().enumerate() {
            hit.rank = i + 1;
        }
        hits
    }

    /// Bullet context for a single-shot prompt (top [`DEFAULT_BULLET_K`]).
    pub fn bullet_context(&self, query: &str) -> String {
        render_bullets(&self.retrieve(query, DEFAULT_BULLET_K))
    }

    /// Labeled, citation-numbered context for a conversational prompt.
    pub fn labeled_context(&self, query: &str, k: usize) -> String {
        render_labeled(&self.retrieve(query, k))
    }

    /// Citation labels for the top `k` results.
    pub fn labels(&self, query: &str, k: usize) -> Vec<String> {
        render_labels(&self.retrieve(query, k))
    }
}
