//! CLI retrieval commands: `civic search` and `civic context`.

use anyhow::Result;

use civiclang_core::context::{render_bullets, render_labeled};
use civiclang_core::retrieve::Retriever;

use crate::config::Config;
use crate::sources::load_configured_corpus;

/// Print ranked matches for `query`.
pub fn run_search(config: &Config, query: &str, k: Option<usize>) -> Result<()> {
    let loaded = load_configured_corpus(config)?;
    let k = k.unwrap_or(config.retrieval.bullet_k);
    let results = Retriever::new(&loaded.corpus).retrieve(query, k);

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for result in &results {
        let doc = result.document;
        let first_line = doc.text.lines().next().unwrap_or("").trim();
        println!(
            "{}. [{}] {} / {}",
            result.rank, result.score, doc.source, first_line
        );
        println!("    excerpt: \"{}\"", excerpt(&doc.text));
        println!("    id: {}", doc.id);
        println!();
    }

    Ok(())
}

/// Print the prompt context that would accompany `query`.
pub fn run_context(config: &Config, query: &str, labeled: bool, k: Option<usize>) -> Result<()> {
    let loaded = load_configured_corpus(config)?;
    let retriever = Retriever::new(&loaded.corpus);

    let context = if labeled {
        render_labeled(&retriever.retrieve(query, k.unwrap_or(config.retrieval.chat_k)))
    } else {
        render_bullets(&retriever.retrieve(query, k.unwrap_or(config.retrieval.bullet_k)))
    };

    if context.is_empty() {
        println!("No results.");
    } else {
        println!("{}", context);
    }
    Ok(())
}

fn excerpt(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(160) {
        Some((idx, _)) => format!("{}…", &flat[..idx]),
        None => flat.to_string(),
    }
}
