//! Corpus sources and Document Store loading.
//!
//! Each source implements [`IngestionSource`]: a uniform `load()` that never
//! fails and instead reports [`SourceLoad::Absent`] or
//! [`SourceLoad::Malformed`]. [`load_corpus`] applies the policy:
//!
//! | Source | Required | Absent / malformed |
//! |--------|----------|--------------------|
//! | FAQ list | yes | startup error |
//! | Glossary | yes | startup error |
//! | Exported folder | no | zero documents |
//!
//! The FAQ list and glossary ship inside the binary and can be replaced by
//! files named in `[data]`. Exported folders are read from
//! `<data.root>/<name>/index.json`, written by the scraper jobs.
//!
//! Sources are loaded in a fixed order (FAQ, glossary, then exported folders
//! in configured order), which is the corpus order used to break score ties.

use anyhow::{bail, Result};
use std::path::PathBuf;

use civiclang_core::corpus::{Corpus, CorpusBuilder};
use civiclang_core::ingest::{self, IngestError, Parsed, FAQ_SOURCE, GLOSSARY_SOURCE};

use crate::config::Config;

const BUNDLED_FAQS: &str = include_str!("../data/faqs.json");
const BUNDLED_GLOSSARY: &str = include_str!("../data/irvine_glossary.json");

/// Outcome of loading one source. Loading never errors; the corpus loader
/// decides what an absent or malformed source means.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLoad {
    Loaded(Parsed),
    Absent,
    Malformed(String),
}

impl SourceLoad {
    fn from_parse(result: std::result::Result<Parsed, IngestError>) -> Self {
        match result {
            Ok(parsed) => SourceLoad::Loaded(parsed),
            Err(e) => SourceLoad::Malformed(e.to_string()),
        }
    }
}

/// A source of civic documents for the corpus.
pub trait IngestionSource: Send + Sync {
    /// Source label, also the `source` of every document it produces.
    fn name(&self) -> &str;

    /// Where the documents come from, for `civic sources` output.
    fn describe(&self) -> String;

    /// Whether the corpus can be built without this source.
    fn is_required(&self) -> bool {
        false
    }

    fn load(&self) -> SourceLoad;
}

/// Where a required source's artifact lives.
#[derive(Debug, Clone)]
pub enum Origin {
    Bundled,
    File(PathBuf),
}

impl Origin {
    fn describe(&self) -> String {
        match self {
            Origin::Bundled => "bundled".to_string(),
            Origin::File(p) => p.display().to_string(),
        }
    }

    fn read(&self, bundled: &'static str) -> std::result::Result<String, SourceLoad> {
        match self {
            Origin::Bundled => Ok(bundled.to_string()),
            Origin::File(path) => read_artifact(path),
        }
    }
}

/// The FAQ list (`[{question, answer}]`).
#[derive(Debug, Clone)]
pub struct FaqSource {
    origin: Origin,
}

impl FaqSource {
    pub fn new(origin: Origin) -> Self {
        Self { origin }
    }
}

impl IngestionSource for FaqSource {
    fn name(&self) -> &str {
        FAQ_SOURCE
    }

    fn describe(&self) -> String {
        self.origin.describe()
    }

    fn is_required(&self) -> bool {
        true
    }

    fn load(&self) -> SourceLoad {
        match self.origin.read(BUNDLED_FAQS) {
            Ok(raw) => SourceLoad::from_parse(ingest::parse_faqs(&raw)),
            Err(status) => status,
        }
    }
}

/// The glossary mapping (`{term: definition}`).
#[derive(Debug, Clone)]
pub struct GlossarySource {
    origin: Origin,
}

impl GlossarySource {
    pub fn new(origin: Origin) -> Self {
        Self { origin }
    }
}

impl IngestionSource for GlossarySource {
    fn name(&self) -> &str {
        GLOSSARY_SOURCE
    }

    fn describe(&self) -> String {
        self.origin.describe()
    }

    fn is_required(&self) -> bool {
        true
    }

    fn load(&self) -> SourceLoad {
        match self.origin.read(BUNDLED_GLOSSARY) {
            Ok(raw) => SourceLoad::from_parse(ingest::parse_glossary(&raw)),
            Err(status) => status,
        }
    }
}

/// An exported folder (`<root>/<name>/index.json`).
#[derive(Debug, Clone)]
pub struct ExportedFolderSource {
    name: String,
    path: PathBuf,
}

impl ExportedFolderSource {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = root.into().join(&name).join("index.json");
        Self { name, path }
    }
}

impl IngestionSource for ExportedFolderSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> SourceLoad {
        match read_artifact(&self.path) {
            Ok(raw) => SourceLoad::from_parse(ingest::parse_exported(&self.name, &raw)),
            Err(status) => status,
        }
    }
}

fn read_artifact(path: &std::path::Path) -> std::result::Result<String, SourceLoad> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceLoad::Absent),
        Err(e) => Err(SourceLoad::Malformed(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// All sources named by the configuration, in corpus order.
pub fn configured_sources(config: &Config) -> Vec<Box<dyn IngestionSource>> {
    let origin = |path: &Option<PathBuf>| match path {
        Some(p) => Origin::File(p.clone()),
        None => Origin::Bundled,
    };

    let mut sources: Vec<Box<dyn IngestionSource>> = vec![
        Box::new(FaqSource::new(origin(&config.data.faqs))),
        Box::new(GlossarySource::new(origin(&config.data.glossary))),
    ];
    for name in &config.data.exported {
        sources.push(Box::new(ExportedFolderSource::new(
            config.data.root.clone(),
            name.clone(),
        )));
    }
    sources
}

/// Load status of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Ok,
    Absent,
    Malformed(String),
}

impl SourceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SourceStatus::Ok => "OK",
            SourceStatus::Absent => "NOT PRESENT",
            SourceStatus::Malformed(_) => "MALFORMED",
        }
    }
}

/// What one source contributed to the corpus.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub name: String,
    pub origin: String,
    pub required: bool,
    pub status: SourceStatus,
    pub documents: usize,
    pub skipped: usize,
}

/// The built corpus plus per-source reports.
#[derive(Debug)]
pub struct LoadedCorpus {
    pub corpus: Corpus,
    pub reports: Vec<SourceReport>,
}

/// Build the corpus from `sources`, in order.
///
/// Fails only when a required source is absent or malformed.
pub fn load_corpus(sources: &[Box<dyn IngestionSource>]) -> Result<LoadedCorpus> {
    let mut builder = CorpusBuilder::new();
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources {
        let name = source.name().to_string();
        let required = source.is_required();

        let (status, parsed) = match source.load() {
            SourceLoad::Loaded(parsed) => (SourceStatus::Ok, parsed),
            SourceLoad::Absent if required => {
                bail!("required source '{}' not found at {}", name, source.describe())
            }
            SourceLoad::Malformed(reason) if required => {
                bail!("required source '{}' is malformed: {}", name, reason)
            }
            SourceLoad::Absent => {
                tracing::debug!(source = %name, origin = %source.describe(), "optional source not present");
                (SourceStatus::Absent, Parsed::default())
            }
            SourceLoad::Malformed(reason) => {
                tracing::warn!(source = %name, %reason, "skipping malformed optional source");
                (SourceStatus::Malformed(reason), Parsed::default())
            }
        };

        if parsed.skipped > 0 {
            tracing::warn!(source = %name, skipped = parsed.skipped, "skipped malformed or empty records");
        }

        let produced = parsed.documents.len();
        let dropped = builder.extend(parsed.documents);
        if dropped > 0 {
            tracing::warn!(source = %name, dropped, "dropped documents with duplicate ids");
        }

        reports.push(SourceReport {
            name,
            origin: source.describe(),
            required,
            status,
            documents: produced - dropped,
            skipped: parsed.skipped,
        });
    }

    let corpus = builder.build();
    tracing::info!(
        documents = corpus.len(),
        sources = reports.len(),
        "corpus loaded"
    );
    Ok(LoadedCorpus { corpus, reports })
}

/// Load the corpus described by `config`.
pub fn load_configured_corpus(config: &Config) -> Result<LoadedCorpus> {
    load_corpus(&configured_sources(config))
}

/// CLI entry point — prints one row per configured source.
pub fn list_sources(config: &Config) -> Result<()> {
    let loaded = load_configured_corpus(config)?;

    println!(
        "{:<16} {:<12} {:<9} {:>6}  ORIGIN",
        "SOURCE", "STATUS", "REQUIRED", "DOCS"
    );
    for r in &loaded.reports {
        println!(
            "{:<16} {:<12} {:<9} {:>6}  {}",
            r.name,
            r.status.label(),
            r.required,
            r.documents,
            r.origin
        );
        if let SourceStatus::Malformed(reason) = &r.status {
            println!("{:<16} reason: {}", "", reason);
        }
    }
    println!("total documents: {}", loaded.corpus.len());

    Ok(())
}
