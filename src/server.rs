//! CivicLang HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (version, corpus size) |
//! | `GET`  | `/api/locales` | Supported locales |
//! | `POST` | `/api/retrieve` | Ranked documents for a query |
//! | `POST` | `/api/context` | Rendered prompt context for a query |
//! | `POST` | `/api/chat` | One conversational turn |
//! | `POST` | `/api/simplify` | Plain-language rewrite |
//! | `POST` | `/api/translate` | Translate and simplify |
//! | `POST` | `/api/rewrite` | Rewrite a message to city staff in a tone |
//! | `POST` | `/api/form-explainer` | Explain a form from text, URL, or file (JSON base64 or multipart) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Please provide a question to begin." } }
//! ```
//!
//! Error codes: `bad_request` (400), `unsupported_media_type` (415),
//! `fetch_failed` (502), `internal` (500). Bodies that fail to parse are
//! reported through the same envelope.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser UI can be
//! served from anywhere.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        FromRequest, Multipart, Request, State,
    },
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use civiclang_core::context::{render_bullets, render_labeled, render_labels};
use civiclang_core::models::ScoredResult;

use crate::assist::{AssistError, Assistant, ChatReply, ChatRequest, DEFAULT_FORM_LANGUAGE};
use crate::config::Config;
use crate::extract::{extract_form_text, fetch_form, ExtractError, FormKind};
use crate::lang::supported_locales;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub locales: Arc<Vec<String>>,
    /// Timeout for fetching forms by URL.
    pub fetch_timeout: Duration,
}

impl AppState {
    pub fn new(assistant: Assistant, config: &Config) -> Self {
        Self {
            assistant: Arc::new(assistant),
            locales: Arc::new(supported_locales(config)),
            fetch_timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }
}

/// Starts the HTTP server on `[server].bind`.
///
/// The corpus is loaded before binding; a missing required source aborts
/// startup.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let assistant = Assistant::from_config(config)?;
    let documents = assistant.corpus().len();
    let app = router(AppState::new(assistant, config));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    println!(
        "CivicLang listening on http://{} ({} documents)",
        config.server.bind, documents
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router. Public so tests can drive it in-process.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/locales", get(handle_locales))
        .route("/api/retrieve", post(handle_retrieve))
        .route("/api/context", post(handle_context))
        .route("/api/chat", post(handle_chat))
        .route("/api/simplify", post(handle_simplify))
        .route("/api/translate", post(handle_translate))
        .route("/api/rewrite", post(handle_rewrite))
        .route("/api/form-explainer", post(handle_form_explainer))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn unsupported_media_type(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
        code: "unsupported_media_type",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

/// Provider and assistant failures. A missing question is the caller's fault.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<AssistError>() {
            return bad_request(e.to_string());
        }
        tracing::error!(error = %err, "request failed");
        internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                unsupported_media_type(rejection.body_text())
            }
            _ => bad_request(rejection.body_text()),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported(_) => unsupported_media_type(err.to_string()),
            ExtractError::Pdf(_) => bad_request(err.to_string()),
            ExtractError::Fetch { .. } => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "fetch_failed",
                message: err.to_string(),
            },
        }
    }
}

// ============ GET /health, /api/locales ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    documents: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        documents: state.assistant.corpus().len(),
    })
}

#[derive(Serialize)]
struct LocalesResponse {
    supported: Vec<String>,
}

async fn handle_locales(State(state): State<AppState>) -> Json<LocalesResponse> {
    Json(LocalesResponse {
        supported: state.locales.as_ref().clone(),
    })
}

// ============ POST /api/retrieve, /api/context ============

#[derive(Deserialize)]
struct RetrieveRequest {
    query: String,
    k: Option<usize>,
}

#[derive(Serialize)]
struct RetrieveResponse<'c> {
    results: Vec<ScoredResult<'c>>,
}

async fn handle_retrieve(
    State(state): State<AppState>,
    body: Result<Json<RetrieveRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = body?;
    let k = req.k.unwrap_or(state.assistant.retrieval().bullet_k);
    let results = state.assistant.retriever().retrieve(&req.query, k);
    Ok(Json(RetrieveResponse { results }).into_response())
}

#[derive(Deserialize)]
struct ContextRequest {
    query: String,
    k: Option<usize>,
    #[serde(default)]
    labeled: bool,
}

#[derive(Serialize)]
struct ContextResponse {
    context: String,
    labels: Vec<String>,
}

async fn handle_context(
    State(state): State<AppState>,
    body: Result<Json<ContextRequest>, JsonRejection>,
) -> Result<Json<ContextResponse>, AppError> {
    let Json(req) = body?;
    let retrieval = state.assistant.retrieval();
    let default_k = if req.labeled {
        retrieval.chat_k
    } else {
        retrieval.bullet_k
    };
    let hits = state
        .assistant
        .retriever()
        .retrieve(&req.query, req.k.unwrap_or(default_k));

    let context = if req.labeled {
        render_labeled(&hits)
    } else {
        render_bullets(&hits)
    };
    Ok(Json(ContextResponse {
        context,
        labels: render_labels(&hits),
    }))
}

// ============ POST /api/chat ============

async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(req) = body?;
    Ok(Json(state.assistant.chat(req).await?))
}

// ============ Single-shot tasks ============

#[derive(Serialize)]
struct OutputResponse {
    output: String,
}

#[derive(Deserialize)]
struct SimplifyRequest {
    text: String,
    lang: String,
}

async fn handle_simplify(
    State(state): State<AppState>,
    body: Result<Json<SimplifyRequest>, JsonRejection>,
) -> Result<Json<OutputResponse>, AppError> {
    let Json(req) = body?;
    let output = state.assistant.simplify(&req.text, &req.lang).await?;
    Ok(Json(OutputResponse { output }))
}

#[derive(Deserialize)]
struct TranslateRequest {
    text: String,
    target: String,
}

async fn handle_translate(
    State(state): State<AppState>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<OutputResponse>, AppError> {
    let Json(req) = body?;
    let output = state.assistant.translate(&req.text, &req.target).await?;
    Ok(Json(OutputResponse { output }))
}

#[derive(Deserialize)]
struct RewriteRequest {
    text: String,
    lang: String,
    tone: String,
}

async fn handle_rewrite(
    State(state): State<AppState>,
    body: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<OutputResponse>, AppError> {
    let Json(req) = body?;
    let output = state
        .assistant
        .rewrite(&req.text, &req.lang, &req.tone)
        .await?;
    Ok(Json(OutputResponse { output }))
}

// ============ POST /api/form-explainer ============

/// JSON form source, checked in order: uploaded file, inline text, URL.
#[derive(Deserialize)]
struct FormRequest {
    text: Option<String>,
    url: Option<String>,
    file_base64: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
    lang: Option<String>,
}

/// A form upload, from either request encoding.
#[derive(Default)]
struct FormInput {
    text: Option<String>,
    url: Option<String>,
    file: Option<Vec<u8>>,
    filename: Option<String>,
    content_type: Option<String>,
    lang: Option<String>,
}

impl FormInput {
    fn from_json(req: FormRequest) -> Result<Self, AppError> {
        let file = match req.file_base64.as_deref() {
            Some(encoded) => Some(
                base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| bad_request(format!("file_base64 is not valid base64: {}", e)))?,
            ),
            None => None,
        };
        Ok(Self {
            text: req.text,
            url: req.url,
            file,
            filename: req.filename,
            content_type: req.content_type,
            lang: req.lang,
        })
    }

    /// Reads the `file`, `text`, `url`, and `lang` parts; others are ignored.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut input = FormInput::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    input.filename = field.file_name().map(str::to_string);
                    input.content_type = field.content_type().map(str::to_string);
                    input.file = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
                }
                "text" => input.text = Some(field.text().await.map_err(multipart_error)?),
                "url" => input.url = Some(field.text().await.map_err(multipart_error)?),
                "lang" => input.lang = Some(field.text().await.map_err(multipart_error)?),
                _ => {}
            }
        }
        Ok(input)
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    bad_request(err.body_text())
}

async fn handle_form_explainer(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<OutputResponse>, AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let input = if is_multipart {
        FormInput::from_multipart(Multipart::from_request(request, &state).await?).await?
    } else {
        let Json(req) = Json::<FormRequest>::from_request(request, &state).await?;
        FormInput::from_json(req)?
    };

    let lang = input
        .lang
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_FORM_LANGUAGE);

    let form_text = if let Some(bytes) = input.file {
        let kind = FormKind::detect(input.content_type.as_deref(), input.filename.as_deref())
            .ok_or_else(|| {
                let described = input
                    .content_type
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .or(input.filename.as_deref())
                    .unwrap_or("unknown");
                ExtractError::Unsupported(described.to_string())
            })?;
        extract_off_runtime(bytes, kind).await?
    } else if let Some(text) = input.text.filter(|t| !t.is_empty()) {
        text
    } else if let Some(url) = input.url.as_deref().filter(|u| !u.is_empty()) {
        let (bytes, kind) = fetch_form(url, state.fetch_timeout).await?;
        extract_off_runtime(bytes, kind).await?
    } else {
        return Err(bad_request(
            "Send JSON with 'file_base64', 'text', or 'url', or a multipart 'file'.",
        ));
    };

    let output = state.assistant.explain_form(&form_text, lang).await?;
    Ok(Json(OutputResponse { output }))
}

/// PDF parsing is CPU-bound; keep it off the async workers.
async fn extract_off_runtime(bytes: Vec<u8>, kind: FormKind) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_form_text(&bytes, kind))
        .await
        .map_err(|e| internal(format!("form extraction task failed: {}", e)))?
        .map_err(AppError::from)
}
