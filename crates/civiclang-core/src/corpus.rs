//! The in-memory corpus of civic documents.
//!
//! A [`Corpus`] is built once through a [`CorpusBuilder`] and is read-only
//! afterwards: no method mutates or removes a document, so a corpus can be
//! shared across threads (typically as `Arc<Corpus>`) without locking.
//!
//! Document order is the order in which ingestion appended them. Ranking
//! never depends on it except to break score ties.

use std::collections::HashSet;

use crate::models::Document;

/// Ordered, immutable collection of [`Document`]s with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    /// Build a corpus directly from documents, dropping any whose id was
    /// already seen.
    pub fn from_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        let mut builder = CorpusBuilder::new();
        builder.extend(docs);
        builder.build()
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Look up a document by id.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

/// Append-only builder for a [`Corpus`].
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    docs: Vec<Document>,
    seen: HashSet<String>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. Returns `false` (and drops the document) when a
    /// document with the same id is already present.
    pub fn push(&mut self, doc: Document) -> bool {
        if !self.seen.insert(doc.id.clone()) {
            return false;
        }
        self.docs.push(doc);
        true
    }

    /// Append many documents, returning how many were dropped as duplicates.
    pub fn extend(&mut self, docs: impl IntoIterator<Item = Document>) -> usize {
        let mut dropped = 0;
        for doc in docs {
            if !self.push(doc) {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn build(self) -> Corpus {
        Corpus { docs: self.docs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_append_order() {
        let mut builder = CorpusBuilder::new();
        builder.push(Document::new("faq-0", "a", "faqs"));
        builder.push(Document::new("glossary-0", "b", "glossary"));
        builder.push(Document::new("ocvote-x", "c", "ocvote"));
        let corpus = builder.build();

        let ids: Vec<&str> = corpus.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["faq-0", "glossary-0", "ocvote-x"]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut builder = CorpusBuilder::new();
        let dropped = builder.extend(vec![
            Document::new("iusd-1", "first", "iusd"),
            Document::new("iusd-1", "second", "iusd"),
            Document::new("iusd-2", "third", "iusd"),
        ]);
        assert_eq!(dropped, 1);

        let corpus = builder.build();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("iusd-1").unwrap().text, "first");
    }

    #[test]
    fn empty_corpus() {
        let corpus = Corpus::default();
        assert!(corpus.is_empty());
        assert!(corpus.get("faq-0").is_none());
    }
}
