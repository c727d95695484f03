use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use civiclang::assist::Assistant;
use civiclang::config::Config;
use civiclang::llm::DisabledProvider;
use civiclang::server::{router, AppState};
use civiclang_core::corpus::Corpus;
use civiclang_core::models::Document;

fn test_router() -> Router {
    let corpus = Corpus::from_documents([
        Document::new(
            "faq-0",
            "My trash pickup was missed. Report it to Irvine Public Works.",
            "faqs",
        ),
        Document::new("faq-1", "Library hours are 9-5.", "faqs"),
        Document::new(
            "ocvote-oc-1",
            "Vote Centers — https://ocvote.gov\n\nFind a vote center near you.",
            "ocvote",
        ),
    ]);
    let config = Config::default();
    let assistant = Assistant::new(
        Arc::new(corpus),
        Arc::new(DisabledProvider),
        config.retrieval.clone(),
    );
    router(AppState::new(assistant, &config))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_corpus_size() {
    let (status, body) = get_json(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["documents"], 3);
}

#[tokio::test]
async fn locales_default_list() {
    let (status, body) = get_json(test_router(), "/api/locales").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supported"], json!(["en", "ko", "zh", "fa", "es"]));
}

#[tokio::test]
async fn retrieve_ranks_and_flattens_documents() {
    let (status, body) =
        post_json(test_router(), "/api/retrieve", json!({"query": "missed trash pickup"})).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "faq-0");
    assert_eq!(results[0]["source"], "faqs");
    assert_eq!(results[0]["score"], 3);
    assert_eq!(results[0]["rank"], 1);
}

#[tokio::test]
async fn retrieve_empty_query_is_empty_result() {
    let (status, body) = post_json(test_router(), "/api/retrieve", json!({"query": "  "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn context_labeled_and_bullets() {
    let (_, body) = post_json(
        test_router(),
        "/api/context",
        json!({"query": "vote center", "labeled": true}),
    )
    .await;
    assert_eq!(body["labels"], json!(["[#1 ocvote]"]));
    assert!(body["context"]
        .as_str()
        .unwrap()
        .starts_with("[#1 ocvote]\nVote Centers"));

    let (_, body) = post_json(test_router(), "/api/context", json!({"query": "vote center"})).await;
    assert!(body["context"].as_str().unwrap().starts_with("- (ocvote) Vote Centers"));
}

#[tokio::test]
async fn chat_offline_reply_uses_camel_case() {
    let (status, body) = post_json(
        test_router(),
        "/api/chat",
        json!({
            "messages": [{"role": "user", "content": "where is a vote center"}],
            "language": "es"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"]
        .as_str()
        .unwrap()
        .starts_with("1. Open the city services portal."));
    assert_eq!(body["detectedLanguage"], "es");
    assert_eq!(body["sources"][0], "[#1 ocvote]");
}

#[tokio::test]
async fn chat_accepts_legacy_shape() {
    let (status, body) = post_json(
        test_router(),
        "/api/chat",
        json!({"question": "Library hours?", "lang": "ko"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detectedLanguage"], "ko");
}

#[tokio::test]
async fn chat_without_question_is_bad_request() {
    let (status, body) = post_json(
        test_router(),
        "/api/chat",
        json!({"messages": [{"role": "assistant", "content": "Hi"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn single_shot_tasks_fall_back_offline() {
    let (_, body) = post_json(
        test_router(),
        "/api/simplify",
        json!({"text": "Bins must be stored.", "lang": "es"}),
    )
    .await;
    assert!(body["output"].as_str().unwrap().starts_with("[DEMO] Simplified (es)"));

    let (_, body) = post_json(
        test_router(),
        "/api/translate",
        json!({"text": "Hello", "target": "Korean"}),
    )
    .await;
    assert!(body["output"].as_str().unwrap().starts_with("[DEMO] (Korean) Hello"));

    let (_, body) = post_json(
        test_router(),
        "/api/rewrite",
        json!({"text": "fix it", "lang": "English", "tone": "polite"}),
    )
    .await;
    assert!(body["output"].as_str().unwrap().starts_with("[DEMO polite]"));
}

#[tokio::test]
async fn form_explainer_accepts_text_and_files() {
    let (status, body) = post_json(
        test_router(),
        "/api/form-explainer",
        json!({"text": "Name: ____"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["output"].as_str().unwrap().starts_with("[DEMO] Steps:"));

    let encoded =
        base64::engine::general_purpose::STANDARD.encode(r"{\rtf1 Name:\tab ____\par}");
    let (status, _) = post_json(
        test_router(),
        "/api/form-explainer",
        json!({"file_base64": encoded, "filename": "permit.rtf", "lang": "Spanish"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn form_explainer_rejects_unsupported_type() {
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG");
    let (status, body) = post_json(
        test_router(),
        "/api/form-explainer",
        json!({"file_base64": encoded, "filename": "scan.png", "content_type": "image/png"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "unsupported_media_type");
}

#[tokio::test]
async fn form_explainer_requires_input() {
    let (status, body) = post_json(test_router(), "/api/form-explainer", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn unparseable_bodies_use_error_envelope() {
    let cases = [
        ("/api/simplify", json!({"text": "x"})),
        ("/api/retrieve", json!({})),
        ("/api/context", json!({"query": 7})),
        (
            "/api/chat",
            json!({"messages": [{"role": "tool", "content": "where do I vote"}]}),
        ),
    ];
    for (uri, body) in cases {
        let (status, body) = post_json(test_router(), uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "bad_request", "{uri}");
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/translate")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn missing_content_type_is_unsupported_media_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/retrieve")
        .body(Body::from(r#"{"query": "vote"}"#))
        .unwrap();
    let (status, body) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "unsupported_media_type");
}

fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let boundary = "civicformboundary";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(filename) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/form-explainer")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn form_explainer_accepts_multipart_upload() {
    let request = multipart_request(&[
        ("lang", None, "Spanish"),
        ("file", Some("permit.rtf"), r"{\rtf1 Name:\tab ____\par}"),
    ]);
    let (status, body) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["output"].as_str().unwrap().starts_with("[DEMO] Steps:"));

    let request = multipart_request(&[("file", Some("scan.png"), "PNG")]);
    let (status, body) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "unsupported_media_type");

    let request = multipart_request(&[("lang", None, "Korean")]);
    let (status, body) = send(test_router(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn form_explainer_reports_unreadable_pdf() {
    let encoded = base64::engine::general_purpose::STANDARD.encode(b"not a pdf");
    let (status, body) = post_json(
        test_router(),
        "/api/form-explainer",
        json!({"file_base64": encoded, "filename": "permit.pdf"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}
