use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ai_llm_service::{AiLlmError, AnswerGenerator};
use api::core::app_state::{AppConfig, AppState};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use services::debug::prettier::PrettierConfig;
use tower::ServiceExt;

const BOUNDARY: &str = "tds-test-boundary";

/// Records each call and what the attachment looked like while it existed.
#[derive(Default)]
struct RecordingAnswerer {
    calls: AtomicUsize,
    seen: Mutex<Option<(PathBuf, String)>>,
}

#[async_trait]
impl AnswerGenerator for RecordingAnswerer {
    async fn generate_answer(
        &self,
        question: &str,
        file_path: Option<&Path>,
    ) -> Result<String, AiLlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(path) = file_path {
            let content = std::fs::read_to_string(path).unwrap_or_default();
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), content));
        }
        Ok(format!("echo: {question}"))
    }
}

struct FailingAnswerer;

#[async_trait]
impl AnswerGenerator for FailingAnswerer {
    async fn generate_answer(&self, _: &str, _: Option<&Path>) -> Result<String, AiLlmError> {
        Err(AiLlmError::Timeout(Duration::from_secs(1)))
    }
}

fn app_with(answerer: Arc<dyn AnswerGenerator>, config: AppConfig) -> Router {
    let state = AppState::new(answerer, &config);
    api::router(state, &config)
}

fn app() -> (Router, Arc<RecordingAnswerer>) {
    let answerer = Arc::new(RecordingAnswerer::default());
    (app_with(answerer.clone(), AppConfig::default()), answerer)
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn urlencoded(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn home_reports_running() {
    let (app, _) = app();
    let req = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "TDS Solver API is running!"}));
}

#[tokio::test]
async fn answers_urlencoded_question() {
    let (app, answerer) = app();
    let (status, body) = send(app, urlencoded("/api/", "question=What+is+2%2B2%3F")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "echo: What is 2+2?"}));
    assert_eq!(answerer.calls.load(Ordering::SeqCst), 1);
    assert!(answerer.seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn attachment_is_visible_during_the_call_and_removed_after() {
    let (app, answerer) = app();
    let req = multipart(
        "/api",
        &[
            Part::Text("question", "Sum column b"),
            Part::File("file", "data.csv", b"a,b\n1,2\n"),
        ],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "echo: Sum column b");

    let (path, content) = answerer.seen.lock().unwrap().clone().unwrap();
    assert_eq!(path.file_name().unwrap(), "data.csv");
    assert_eq!(content, "a,b\n1,2\n");
    assert!(!path.exists());
}

#[tokio::test]
async fn missing_question_is_rejected_before_the_llm() {
    let (app, answerer) = app();
    let req = multipart("/api/", &[Part::File("file", "x.txt", b"hi")]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"detail": "field required: question"}));
    assert_eq!(answerer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn llm_failure_is_a_server_error() {
    let app = app_with(Arc::new(FailingAnswerer), AppConfig::default());
    let (status, body) = send(app, urlencoded("/api/", "question=hello")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn sums_data_values() {
    let (app, _) = app();
    let html = r#"<div class="foo" data-value="1.5"></div><div class="foo" data-value="1"></div><div class="bar" data-value="9"></div>"#;
    let req = multipart("/api/sum-data-values", &[Part::Text("html", html)]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": 2.5}));
}

#[tokio::test]
async fn sum_without_html_is_rejected() {
    let (app, _) = app();
    let (status, body) = send(app, urlencoded("/api/sum-data-values", "")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"detail": "field required: html"}));
}

#[tokio::test]
async fn sum_with_empty_html_is_rejected() {
    let (app, _) = app();
    let (status, body) = send(app, urlencoded("/api/sum-data-values", "html=")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"detail": "field required: html"}));
}

#[tokio::test]
async fn sum_without_matches_is_positive_zero() {
    let (app, _) = app();
    let req = multipart("/api/sum-data-values", &[Part::Text("html", "<p>none</p>")]);
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], br#"{"answer":0.0}"#);
}

#[tokio::test]
async fn converts_key_value_file() {
    let (app, _) = app();
    let req = multipart(
        "/convert-json",
        &[Part::File("file", "pairs.txt", b"b=2\na=1\n")],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"answer": "21f76dfbfe6dfe21f762080ef484112cf2952974cef30741fd1931e1c6d92112"})
    );
}

#[tokio::test]
async fn convert_requires_a_file() {
    let (app, _) = app();
    let req = multipart("/convert-json", &[Part::Text("other", "x")]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"detail": "field required: file"}));
}

#[tokio::test]
async fn convert_rejects_non_utf8() {
    let (app, _) = app();
    let req = multipart("/convert-json", &[Part::File("file", "bad.txt", &[0xff, 0xfe, b'='])]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("upload is not valid UTF-8"));
}

#[tokio::test]
async fn debug_unknown_function_is_refused() {
    let (app, _) = app();
    let req = multipart("/debug/shutdown_server", &[]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "Function shutdown_server not supported for direct testing"})
    );
}

#[tokio::test]
async fn debug_prettier_needs_an_upload() {
    let (app, _) = app();
    let req = multipart("/debug/calculate_prettier_sha256", &[Part::Text("params", "{}")]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "No file provided for calculate_prettier_sha256"})
    );
}

#[tokio::test]
async fn debug_empty_params_default_to_empty_object() {
    let (app, _) = app();
    let req = multipart("/debug/calculate_prettier_sha256", &[Part::Text("params", "")]);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "No file provided for calculate_prettier_sha256"})
    );
}

#[tokio::test]
async fn debug_bad_params_come_back_with_traceback() {
    let (app, _) = app();
    let req = multipart(
        "/debug/analyze_sales_with_phonetic_clustering",
        &[Part::Text("params", "{not json")],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().starts_with("params must be valid JSON"));
    assert!(body["traceback"].as_str().is_some());
}

#[tokio::test]
async fn debug_sales_reads_the_upload() {
    let (app, _) = app();
    let data = br#"[
        {"city": "Shanghai", "product": "Soap", "sales": 10},
        {"city": "Shanghaii", "product": "Soap", "sales": 5},
        {"city": "Lagos", "product": "Soap", "sales": 7},
        {"city": "Shanghai", "product": "Rope", "sales": 3}
    ]"#;
    let req = multipart(
        "/debug/analyze_sales_with_phonetic_clustering",
        &[
            Part::Text("params", r#"{"product":"Soap","city":"Shanghai"}"#),
            Part::File("file", "sales.json", data),
        ],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["total_sales"], 15);
    assert_eq!(body["result"]["transactions"], 2);
}

#[cfg(unix)]
#[tokio::test]
async fn debug_prettier_hashes_formatter_output() {
    let config = AppConfig {
        prettier: PrettierConfig {
            program: "cat".into(),
            args: Vec::new(),
            timeout: Duration::from_secs(10),
        },
        ..AppConfig::default()
    };
    let app = app_with(Arc::new(RecordingAnswerer::default()), config);
    let req = multipart(
        "/debug/calculate_prettier_sha256",
        &[Part::File("file", "README.md", b"hello prettier\n")],
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"result": "680110c8be382b12b7fef3afbd3e956fe83490eea5f560533f0d42ea881a4004"})
    );
}

#[tokio::test]
async fn debug_route_can_be_disabled() {
    let config = AppConfig {
        debug_endpoints: false,
        ..AppConfig::default()
    };
    let app = app_with(Arc::new(RecordingAnswerer::default()), config);
    let res = app
        .oneshot(multipart("/debug/calculate_prettier_sha256", &[]))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_mirrors_request_on_every_route() {
    let (app, _) = app();
    for uri in [
        "/",
        "/api/",
        "/api/sum-data-values",
        "/convert-json",
        "/debug/anything",
    ] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, "https://exam.example.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-exam-token")
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let headers = res.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://exam.example.org",
            "{uri}"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true", "{uri}");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST", "{uri}");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type,x-exam-token",
            "{uri}"
        );
    }
}
