//! Assistant operations shared by the HTTP server and the CLI.
//!
//! An [`Assistant`] owns the loaded corpus and a completion provider. Each
//! operation builds its prompt from [`crate::prompt`], retrieves local
//! context where relevant, and falls back to deterministic demo text when
//! no provider is configured.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use civiclang_core::context::render_bullets;
use civiclang_core::corpus::Corpus;
use civiclang_core::retrieve::Retriever;

use crate::config::{Config, RetrievalConfig};
use crate::lang::{detect_language, language_name};
use crate::llm::{complete_or_fallback, create_provider, ChatMessage, CompletionProvider, Role};
use crate::prompt;
use crate::sources::load_configured_corpus;

/// Language code meaning "reply in whatever language the user wrote".
pub const AUTO_LANGUAGE: &str = "auto";

/// Default language for form explanations.
pub const DEFAULT_FORM_LANGUAGE: &str = "English";

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Please provide a question to begin.")]
    NoQuestion,
}

/// A chat turn request.
///
/// Accepts the conversational shape (`messages` + `language`) and the
/// older single-shot shape (`question` + `lang`). `messages` wins when both
/// are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub language: Option<String>,
    pub question: Option<String>,
    pub lang: Option<String>,
}

impl ChatRequest {
    pub fn from_question(question: impl Into<String>, lang: Option<String>) -> Self {
        Self {
            question: Some(question.into()),
            lang,
            ..Default::default()
        }
    }

    /// Conversation history and requested language after normalization.
    fn normalize(self) -> (Vec<ChatMessage>, String) {
        let mut language = self.language.unwrap_or_else(|| AUTO_LANGUAGE.to_string());
        let mut history = self.messages;

        if history.is_empty() {
            if let Some(question) = self.question.filter(|q| !q.is_empty()) {
                history.push(ChatMessage::user(question));
                if let Some(lang) = self.lang {
                    language = lang;
                }
            }
        }
        (history, language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub detected_language: String,
    /// Citation labels of the context blocks sent with the question.
    pub sources: Vec<String>,
}

pub struct Assistant {
    corpus: Arc<Corpus>,
    provider: Arc<dyn CompletionProvider>,
    retrieval: RetrievalConfig,
}

impl Assistant {
    pub fn new(
        corpus: Arc<Corpus>,
        provider: Arc<dyn CompletionProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            corpus,
            provider,
            retrieval,
        }
    }

    /// Load the configured corpus and provider.
    ///
    /// Fails when a required source is missing or malformed, or the provider
    /// name is unknown.
    pub fn from_config(config: &Config) -> Result<Self> {
        let loaded = load_configured_corpus(config)?;
        let provider = create_provider(&config.llm)?;
        tracing::info!(
            documents = loaded.corpus.len(),
            model = provider.model_name(),
            "assistant ready"
        );
        Ok(Self::new(
            Arc::new(loaded.corpus),
            provider,
            config.retrieval.clone(),
        ))
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn retriever(&self) -> Retriever<'_> {
        Retriever::new(&self.corpus)
    }

    pub fn provider(&self) -> &dyn CompletionProvider {
        self.provider.as_ref()
    }

    pub fn retrieval(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Single-shot answer grounded in bullet context.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let context = render_bullets(&self.retriever().retrieve(question, self.retrieval.bullet_k));
        let wrapped = prompt::rag_wrap(question, &context);
        self.single_shot(wrapped, prompt::demo_chat_reply).await
    }

    /// One conversational turn.
    ///
    /// The latest user message drives retrieval. The model sees the system
    /// prompt, the non-system history, then the question sandwiched with
    /// labeled context.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let (history, requested) = request.normalize();

        let question = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .filter(|q| !q.is_empty())
            .ok_or(AssistError::NoQuestion)?;

        let retriever = self.retriever();
        let k = self.retrieval.chat_k;
        let context = retriever.labeled_context(&question, k);
        let sources = retriever.labels(&question, k);

        let target = if requested == AUTO_LANGUAGE {
            "the user's language"
        } else {
            language_name(&requested).unwrap_or("the user's language")
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(prompt::chat_system_prompt(target)));
        messages.extend(history.into_iter().filter(|m| m.role != Role::System));
        messages.push(ChatMessage::user(prompt::sandwich(&question, &context)));

        tracing::debug!(
            messages = messages.len(),
            context_blocks = sources.len(),
            "chat turn"
        );

        let reply =
            complete_or_fallback(self.provider(), &messages, prompt::demo_chat_reply).await?;
        let reply = if reply.is_empty() {
            "I couldn’t generate a reply. Please try again.".to_string()
        } else {
            reply
        };

        let detected_language = if requested == AUTO_LANGUAGE {
            detect_language(&question).to_string()
        } else {
            requested
        };

        Ok(ChatReply {
            reply,
            detected_language,
            sources,
        })
    }

    pub async fn simplify(&self, text: &str, lang: &str) -> Result<String> {
        self.single_shot(prompt::simplify_prompt(text, lang), || {
            prompt::demo_simplify(lang)
        })
        .await
    }

    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        self.single_shot(prompt::translate_prompt(text, target), || {
            prompt::demo_translate(text, target)
        })
        .await
    }

    pub async fn rewrite(&self, text: &str, lang: &str, tone: &str) -> Result<String> {
        self.single_shot(prompt::rewrite_prompt(text, lang, tone), || {
            prompt::demo_rewrite(tone)
        })
        .await
    }

    /// Step-by-step explanation of extracted form text.
    pub async fn explain_form(&self, form_text: &str, lang: &str) -> Result<String> {
        self.single_shot(
            prompt::form_prompt(form_text, lang),
            prompt::demo_form_explanation,
        )
        .await
    }

    async fn single_shot<F>(&self, user_prompt: String, fallback: F) -> Result<String>
    where
        F: FnOnce() -> String,
    {
        let messages = [
            ChatMessage::system(prompt::BASE_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ];
        complete_or_fallback(self.provider(), &messages, fallback).await
    }
}
