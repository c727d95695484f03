//! # CivicLang Core
//!
//! Pure retrieval logic for CivicLang: civic documents, the corpus they
//! live in, keyword-overlap scoring, ranked retrieval, and the context
//! strings that get sandwiched into language-model prompts.
//!
//! This crate performs no filesystem or network I/O. Callers parse or load
//! source artifacts however they like and hand JSON text or records to the
//! [`ingest`] adapters.
//!
//! ```rust
//! use civiclang_core::corpus::Corpus;
//! use civiclang_core::models::Document;
//! use civiclang_core::retrieve::Retriever;
//!
//! let corpus = Corpus::from_documents(vec![Document::new(
//!     "faq-0",
//!     "Trash pickup missed? Contact Public Works.",
//!     "faqs",
//! )]);
//! let hits = Retriever::new(&corpus).retrieve("missed trash pickup", 5);
//! assert_eq!(hits[0].score, 3);
//! ```

pub mod context;
pub mod corpus;
pub mod ingest;
pub mod models;
pub mod retrieve;
pub mod score;
