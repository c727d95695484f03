//! Prompt builders and offline fallback replies.
//!
//! Every function here is a pure string builder. Retrieved context arrives
//! already rendered by [`civiclang_core::context`].

use civiclang_core::context::truncate_chars;

/// System prompt for single-shot tasks.
pub const BASE_SYSTEM_PROMPT: &str =
    "You are CivicLang, a local civic assistant for Irvine. Be concise and helpful.";

/// Maximum form-text characters sent to the model.
pub const FORM_TEXT_LIMIT: usize = 8000;

/// Wrap a question with bullet context for a single-shot answer.
pub fn rag_wrap(question: &str, bullet_context: &str) -> String {
    format!(
        "Use the context below about Irvine to answer. If insufficient, answer generally and say what you are assuming.\nContext:\n{bullet_context}\n\nUser: {question}"
    )
}

/// System prompt for the conversational assistant.
pub fn chat_system_prompt(target_language: &str) -> String {
    [
        "You are Civic Chat, a helpful assistant for Irvine residents.".to_string(),
        format!("ALWAYS reply in {target_language}."),
        "Start with clear, numbered, step-by-step instructions (1., 2., 3., …).".to_string(),
        "After the steps, include brief bullet points with key links, phone numbers, or office hours if relevant.".to_string(),
        "If you used local context snippets, add: \"Sources: [#1 label], [#2 label]\".".to_string(),
        "If missing details, state what you need and ask up to 2 clarifying questions.".to_string(),
    ]
    .join("\n")
}

/// The latest user question with labeled context sandwiched after it.
///
/// An empty context adds nothing beyond the question.
pub fn sandwich(question: &str, labeled_context: &str) -> String {
    let mut out = format!("USER QUESTION:\n{question}");
    if !labeled_context.is_empty() {
        out.push_str("\n\nLOCAL CONTEXT (use if relevant; otherwise ignore):\n");
        out.push_str(labeled_context);
        out.push_str("\n\n— end of context —");
    }
    out
}

pub fn simplify_prompt(text: &str, lang: &str) -> String {
    format!(
        "Rewrite the following in plain language for a resident. Output language: {lang}. Text: {text}"
    )
}

pub fn translate_prompt(text: &str, target: &str) -> String {
    format!(
        "Translate and simplify into {target}. Keep meaning accurate and civic-friendly. Text: {text}"
    )
}

pub fn rewrite_prompt(text: &str, lang: &str, tone: &str) -> String {
    format!(
        "Rewrite this message to city staff in a {tone} tone in {lang}. Keep it concise and respectful: {text}"
    )
}

/// Step-by-step explanation request for extracted form text.
pub fn form_prompt(form_text: &str, lang: &str) -> String {
    let clipped = truncate_chars(form_text, FORM_TEXT_LIMIT, "");
    format!(
        "Explain the following civic form content step-by-step in {lang}.\n\
         - Use clear, plain-language bullet points.\n\
         - List what the resident needs (documents, IDs, deadlines).\n\
         - Summarize any contact info or submission instructions.\n\
         - If fields are present, explain what to write in each.\n\
         \n\
         TEXT:\n\
         {clipped}"
    )
    .trim()
    .to_string()
}

// ============ Offline fallbacks ============

pub fn demo_chat_reply() -> String {
    [
        "1. Open the city services portal.",
        "2. Select the category and enter your address.",
        "3. Describe the issue and submit the form.",
        "",
        "• Phone: 949-724-6000",
        "• Sources: Irvine Public Works",
    ]
    .join("\n")
}

pub fn demo_simplify(lang: &str) -> String {
    format!(
        "[DEMO] Simplified ({lang}): Keep your trash bins out of street view except on collection day."
    )
}

pub fn demo_translate(text: &str, target: &str) -> String {
    format!("[DEMO] ({target}) {text} — (simplified translation not available offline)")
}

pub fn demo_rewrite(tone: &str) -> String {
    format!(
        "[DEMO {tone}] Hello, my trash was not collected today. Could you advise on the next steps?"
    )
}

pub fn demo_form_explanation() -> String {
    "[DEMO] Steps:\n1) Read each section title.\n2) Fill your name and address.\n3) Provide required IDs.\n(Offline demo cannot fully parse/translate without API key.)".to_string()
}
