//! TOML configuration for CivicLang.
//!
//! Every section is optional; an empty file yields the defaults below.
//!
//! ```toml
//! [data]
//! root = "./data"
//! exported = ["cityofirvine", "iusd", "ocvote", "data_ca_gov"]
//!
//! [retrieval]
//! bullet_k = 5
//! chat_k = 3
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! ```
//!
//! Environment overrides: `OPENAI_MODEL` replaces `llm.model`, and
//! `CIVICLANG_LOCALES` (comma-separated) replaces `locales.supported`.
//! The OpenAI key is only ever read from `OPENAI_API_KEY`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub locales: LocalesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory holding exported sources as `<root>/<name>/index.json`.
    #[serde(default = "default_data_root")]
    pub root: PathBuf,
    /// FAQ list overriding the bundled one.
    #[serde(default)]
    pub faqs: Option<PathBuf>,
    /// Glossary mapping overriding the bundled one.
    #[serde(default)]
    pub glossary: Option<PathBuf>,
    /// Exported source folders, in corpus order.
    #[serde(default = "default_exported")]
    pub exported: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
            faqs: None,
            glossary: None,
            exported: default_exported(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}
fn default_exported() -> Vec<String> {
    ["cityofirvine", "iusd", "ocvote", "data_ca_gov"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_bullet_k")]
    pub bullet_k: usize,
    #[serde(default = "default_chat_k")]
    pub chat_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            bullet_k: default_bullet_k(),
            chat_k: default_chat_k(),
        }
    }
}

fn default_bullet_k() -> usize {
    civiclang_core::retrieve::DEFAULT_BULLET_K
}
fn default_chat_k() -> usize {
    civiclang_core::retrieve::DEFAULT_CHAT_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_url: default_base_url(),
        }
    }
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalesConfig {
    #[serde(default = "default_locales")]
    pub supported: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            supported: default_locales(),
        }
    }
}

fn default_locales() -> Vec<String> {
    ["en", "ko", "zh", "fa", "es"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the defaults (with
/// environment overrides applied).
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    tracing::debug!(path = %path.display(), "no config file; using defaults");
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse and validate configuration text without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(model) = std::env::var("OPENAI_MODEL") {
        if !model.trim().is_empty() {
            config.llm.model = model.trim().to_string();
        }
    }
    if let Ok(locales) = std::env::var("CIVICLANG_LOCALES") {
        let parsed = parse_locale_list(&locales);
        if !parsed.is_empty() {
            config.locales.supported = parsed;
        }
    }
}

/// Split a comma-separated locale list, trimming blanks.
pub fn parse_locale_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate(config: &Config) -> Result<()> {
    // Validate retrieval
    if config.retrieval.bullet_k < 1 {
        bail!("retrieval.bullet_k must be >= 1");
    }
    if config.retrieval.chat_k < 1 {
        bail!("retrieval.chat_k must be >= 1");
    }

    // Validate llm
    match config.llm.provider.as_str() {
        "disabled" | "openai" => {}
        other => bail!(
            "Unknown llm provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        bail!("llm.temperature must be in [0.0, 2.0]");
    }
    if config.llm.is_enabled() && config.llm.model.trim().is_empty() {
        bail!("llm.model must be specified when provider is '{}'", config.llm.provider);
    }

    // Validate exported source names
    let mut seen = HashSet::new();
    for name in &config.data.exported {
        if name.trim().is_empty() {
            bail!("data.exported entries must not be empty");
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            bail!("data.exported entry '{}' must be a plain folder name", name);
        }
        if !seen.insert(name.as_str()) {
            bail!("data.exported lists '{}' more than once", name);
        }
    }

    Ok(())
}
