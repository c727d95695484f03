//! Plain-text extraction for uploaded civic forms (text, RTF, PDF).
//!
//! Callers supply bytes plus a content type and/or file name; this module
//! returns UTF-8 text for the form explainer. Extraction failures are
//! returned as [`ExtractError`], never panics.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_RTF: &str = "application/rtf";
pub const MIME_PDF: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Form formats the explainer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    PlainText,
    Rtf,
    Pdf,
}

impl FormKind {
    /// Classify an upload by content type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Option<FormKind> {
        let ct = content_type.unwrap_or("").to_ascii_lowercase();
        let name = filename.unwrap_or("").to_ascii_lowercase();

        if ct == MIME_TEXT || name.ends_with(".txt") {
            Some(FormKind::PlainText)
        } else if ct == MIME_RTF || ct == "text/rtf" || name.ends_with(".rtf") {
            Some(FormKind::Rtf)
        } else if ct == MIME_PDF || name.ends_with(".pdf") {
            Some(FormKind::Pdf)
        } else {
            None
        }
    }

    /// Classify a fetched document. Anything not PDF or RTF is read as text.
    pub fn for_download(content_type: &str, url: &str) -> FormKind {
        let ct = content_type.to_ascii_lowercase();
        let url = url.to_ascii_lowercase();
        if ct.contains("pdf") || url.ends_with(".pdf") {
            FormKind::Pdf
        } else if ct.contains("rtf") || url.ends_with(".rtf") {
            FormKind::Rtf
        } else {
            FormKind::PlainText
        }
    }
}

/// Extract plain text from form bytes.
pub fn extract_form_text(bytes: &[u8], kind: FormKind) -> Result<String, ExtractError> {
    match kind {
        FormKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        FormKind::Rtf => Ok(strip_rtf(&String::from_utf8_lossy(bytes))),
        FormKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
    }
}

static RTF_HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\'[0-9a-fA-F]{2}").unwrap());
static RTF_PAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\pard?").unwrap());
static RTF_TAB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\tab").unwrap());
static RTF_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-z]+-?\d* ?").unwrap());
static RTF_BRACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}]").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Reduce RTF markup to readable text.
///
/// Hex escapes become spaces, `\par`/`\pard` newlines, `\tab` tabs; other
/// control words and group braces are removed and long blank runs collapse
/// to one blank line. Good enough for civic forms, not a full RTF reader.
pub fn strip_rtf(raw: &str) -> String {
    let s = RTF_HEX.replace_all(raw, " ");
    let s = RTF_PAR.replace_all(&s, "\n");
    let s = RTF_TAB.replace_all(&s, "\t");
    let s = RTF_CONTROL.replace_all(&s, "");
    let s = RTF_BRACES.replace_all(&s, "");
    let s = BLANK_RUNS.replace_all(&s, "\n\n");
    s.trim().to_string()
}

/// Download a form and classify it from the response content type and URL.
pub async fn fetch_form(url: &str, timeout: Duration) -> Result<(Vec<u8>, FormKind), ExtractError> {
    let fetch_err = |reason: String| ExtractError::Fetch {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| fetch_err(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fetch_err(format!("HTTP {}", response.status())));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    Ok((bytes.to_vec(), FormKind::for_download(&content_type, url)))
}
