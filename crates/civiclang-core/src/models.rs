//! Core data models: the retrievable [`Document`] and the per-query
//! [`ScoredResult`] that pairs a document with its score and rank.

use serde::{Deserialize, Serialize};

/// A single retrievable unit of civic text.
///
/// `text` is used both for scoring and for inclusion in prompt context and
/// may carry a human-readable header (title and source URL) ahead of the
/// body. `source` labels provenance and is shared by many documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub source: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
        }
    }
}

/// A document scored against one query.
///
/// Borrowed from the corpus for the duration of a retrieval call.
/// Serializes flat as `{id, text, source, score, rank}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredResult<'c> {
    #[serde(flatten)]
    pub document: &'c Document,
    /// Number of query terms found in the document text.
    pub score: usize,
    /// 1-based position in the ranked output.
    pub rank: usize,
}

impl ScoredResult<'_> {
    /// Citation label used in labeled context, e.g. `[#1 ocvote]`.
    pub fn label(&self) -> String {
        format!("[#{} {}]", self.rank, self.document.source)
    }
}
