//! Ingestion adapters: map source-specific record shapes into [`Document`]s.
//!
//! | Source | Record shape | Document id | Text |
//! |--------|--------------|-------------|------|
//! | FAQ | `{question, answer}` (or `{q, a}`) | `faq-<index>` | `"<question> <answer>"` |
//! | Glossary | `{"<term>": "<definition>", ...}` | `glossary-<index>` | `"<term>: <definition>"` |
//! | Exported folder | `[{title?, url?, text, id?, ...}]` | `<source>-<id or index>` | `"<title> — <url>\n\n<body>"` |
//!
//! The `parse_*` functions validate each record independently: a malformed
//! record is skipped and counted, while a document that is not the expected
//! top-level shape (not JSON, not a list, not an object) is an
//! [`IngestError`]. Whether that error is fatal is the caller's decision.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::truncate_chars;
use crate::models::Document;

/// Source label for FAQ documents.
pub const FAQ_SOURCE: &str = "faqs";

/// Source label for glossary documents.
pub const GLOSSARY_SOURCE: &str = "glossary";

/// Maximum body characters kept per exported record.
pub const EXPORT_BODY_LIMIT: usize = 800;

/// Appended to exported bodies cut at [`EXPORT_BODY_LIMIT`].
pub const EXPORT_BODY_MARKER: &str = "…";

/// Top-level shape errors for a source artifact.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Documents produced from one artifact, plus the number of records skipped
/// as malformed or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    pub documents: Vec<Document>,
    pub skipped: usize,
}

/// One FAQ pair.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqEntry {
    #[serde(alias = "q")]
    pub question: String,
    #[serde(alias = "a")]
    pub answer: String,
}

/// Record identifier in an exported artifact (exporters write either form).
///
/// Empty strings, zero, and any other JSON value count as "no id".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
    Other(Value),
}

impl RecordId {
    fn as_label(&self) -> Option<String> {
        match self {
            RecordId::Text(s) if s.is_empty() => None,
            RecordId::Text(s) => Some(s.clone()),
            RecordId::Number(n) if n.as_f64() == Some(0.0) => None,
            RecordId::Number(n) => Some(n.to_string()),
            RecordId::Other(_) => None,
        }
    }
}

/// One page exported by a scraper. Only `text` is required; other fields
/// the exporter writes are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub title: Option<String>,
    pub text: String,
}

/// Non-string metadata (numbers, nulls, lists) reads as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// FAQ pairs to documents. Pairs whose joined text is blank are dropped.
pub fn faq_documents(entries: &[FaqEntry]) -> Vec<Document> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, f)| faq_document(i, f))
        .collect()
}

fn faq_document(index: usize, entry: &FaqEntry) -> Option<Document> {
    let text = format!("{} {}", entry.question, entry.answer);
    if text.trim().is_empty() {
        return None;
    }
    Some(Document::new(format!("faq-{index}"), text, FAQ_SOURCE))
}

/// Glossary term/definition pairs to documents, in iteration order.
pub fn glossary_documents<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Vec<Document>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (term, definition))| glossary_document(i, term.as_ref(), definition.as_ref()))
        .collect()
}

fn glossary_document(index: usize, term: &str, definition: &str) -> Document {
    Document::new(
        format!("glossary-{index}"),
        format!("{term}: {definition}"),
        GLOSSARY_SOURCE,
    )
}

/// Exported records to documents labeled with `source_name`.
///
/// Records with a blank body are dropped; indices used for ids are the
/// record's position in `records`.
pub fn exported_documents(source_name: &str, records: &[ExportedRecord]) -> Vec<Document> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| exported_document(source_name, i, r))
        .collect()
}

fn exported_document(source_name: &str, index: usize, record: &ExportedRecord) -> Option<Document> {
    if record.text.trim().is_empty() {
        return None;
    }

    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled");
    let header = match record.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => format!("{title} — {url}"),
        None => title.to_string(),
    };
    let body = truncate_chars(&record.text, EXPORT_BODY_LIMIT, EXPORT_BODY_MARKER);
    let key = record
        .id
        .as_ref()
        .and_then(RecordId::as_label)
        .unwrap_or_else(|| index.to_string());

    Some(Document::new(
        format!("{source_name}-{key}"),
        format!("{header}\n\n{body}"),
        source_name,
    ))
}

/// Parse a FAQ list artifact.
pub fn parse_faqs(json: &str) -> Result<Parsed, IngestError> {
    let items = expect_array(serde_json::from_str(json)?)?;
    let total = items.len();
    let documents: Vec<Document> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let entry: FaqEntry = serde_json::from_value(v).ok()?;
            faq_document(i, &entry)
        })
        .collect();
    Ok(Parsed {
        skipped: total - documents.len(),
        documents,
    })
}

/// Parse a glossary mapping artifact, keeping file order.
///
/// Entries whose definition is not a string are skipped; the remaining
/// entries keep their positional index in the file.
pub fn parse_glossary(json: &str) -> Result<Parsed, IngestError> {
    let map = match serde_json::from_str::<Value>(json)? {
        Value::Object(map) => map,
        other => {
            return Err(IngestError::Shape {
                expected: "object",
                found: kind(&other),
            })
        }
    };
    let total = map.len();
    let documents: Vec<Document> = map
        .iter()
        .enumerate()
        .filter_map(|(i, (term, definition))| {
            Some(glossary_document(i, term, definition.as_str()?))
        })
        .collect();
    Ok(Parsed {
        skipped: total - documents.len(),
        documents,
    })
}

/// Parse an exported-source artifact (a list of page records).
pub fn parse_exported(source_name: &str, json: &str) -> Result<Parsed, IngestError> {
    let items = expect_array(serde_json::from_str(json)?)?;
    let total = items.len();
    let documents: Vec<Document> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let record: ExportedRecord = serde_json::from_value(v).ok()?;
            exported_document(source_name, i, &record)
        })
        .collect();
    Ok(Parsed {
        skipped: total - documents.len(),
        documents,
    })
}

fn expect_array(value: Value) -> Result<Vec<Value>, IngestError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(IngestError::Shape {
            expected: "array",
            found: kind(&other),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
