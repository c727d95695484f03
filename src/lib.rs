//! # CivicLang
//!
//! A multilingual civic assistant for Irvine residents, grounded in a small
//! local corpus of FAQs, a glossary, and exported public pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │   Sources    │──▶│    Corpus    │──▶│   Retriever    │
//! │ FAQ/Glossary │   │ (in memory)  │   │ keyword overlap│
//! │  Exported    │   └──────────────┘   └───────┬────────┘
//! └──────────────┘                              │ context
//!                                               ▼
//!                      ┌──────────┐       ┌───────────┐
//!                      │   CLI    │◀──────│ Assistant │──▶ LLM (optional)
//!                      │ (civic)  │       └─────┬─────┘
//!                      └──────────┘             ▼
//!                                          ┌──────────┐
//!                                          │   HTTP   │
//!                                          └──────────┘
//! ```
//!
//! Retrieval itself lives in `civiclang-core`; this crate adds loading,
//! prompting, the completion provider, form extraction, and the surfaces.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`sources`] | Ingestion sources and corpus loading |
//! | [`search`] | `civic search` / `civic context` commands |
//! | [`llm`] | Completion provider abstraction |
//! | [`prompt`] | Prompt builders and offline fallbacks |
//! | [`lang`] | Language hints |
//! | [`extract`] | Form text extraction |
//! | [`assist`] | Assistant operations |
//! | [`server`] | HTTP API |

pub mod assist;
pub mod config;
pub mod extract;
pub mod lang;
pub mod llm;
pub mod prompt;
pub mod search;
pub mod server;
pub mod sources;
