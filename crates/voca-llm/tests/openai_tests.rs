//! OpenAI client tests against a local stub server.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use voca_core::VocaError;
use voca_llm::{ChatProvider, ChatRequest, ImageProvider, ImageRequest, OpenAiProvider};

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn image_request() -> ImageRequest {
    ImageRequest {
        model: "dall-e-3".into(),
        prompt: "a glowing apple, 2D pixel art".into(),
        size: "1024x1024".into(),
    }
}

// ── Chat ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_returns_first_choice_content() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
            assert_eq!(bearer(&headers).as_deref(), Some("Bearer sk-test"));
            assert_eq!(body["response_format"]["type"], "json_object");
            Json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"name\":\"Apple Rain\"}" } }]
            }))
        }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk-test".into()).with_base_url(base);

    let req = ChatRequest::new("gpt-3.5-turbo", "make a skill").json();
    let text = provider.complete(&req).await.unwrap();
    assert_eq!(text, "{\"name\":\"Apple Rain\"}");
}

#[tokio::test]
async fn test_chat_non_success_carries_status_and_body() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk-bad".into()).with_base_url(base);

    let err = provider
        .complete(&ChatRequest::new("gpt-3.5-turbo", "hi"))
        .await
        .unwrap_err();
    match err {
        VocaError::LlmProvider(msg) => {
            assert!(msg.starts_with("HTTP 401"), "got: {msg}");
            assert!(msg.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_missing_content_is_malformed() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(serde_json::json!({ "choices": [] })) }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into()).with_base_url(base);
    let err = provider
        .complete(&ChatRequest::new("m", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, VocaError::MalformedOutput(_)));
}

// ── Images ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_image_success() {
    let router = Router::new().route(
        "/v1/images/generations",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["response_format"], "b64_json");
            Json(serde_json::json!({ "data": [{ "b64_json": "iVBORw0KGgo=" }] }))
        }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into()).with_base_url(base);
    assert_eq!(provider.generate(&image_request()).await.unwrap(), "iVBORw0KGgo=");
}

#[tokio::test]
async fn test_image_policy_rejection_is_classified() {
    let router = Router::new().route(
        "/v1/images/generations",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": {
                        "code": "content_policy_violation",
                        "message": "Your request was rejected as a result of our safety system.",
                        "type": "invalid_request_error"
                    }
                })),
            )
        }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into()).with_base_url(base);
    let err = provider.generate(&image_request()).await.unwrap_err();
    assert!(err.is_retryable_image_failure());
    assert_eq!(err.image_error_code(), Some("content_policy_violation"));
}

#[tokio::test]
async fn test_image_server_error_is_fatal() {
    let router = Router::new().route(
        "/v1/images/generations",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into()).with_base_url(base);
    let err = provider.generate(&image_request()).await.unwrap_err();
    assert!(!err.is_retryable_image_failure());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_image_success_without_payload_is_fatal() {
    let router = Router::new().route(
        "/v1/images/generations",
        post(|| async { Json(serde_json::json!({ "data": [] })) }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into()).with_base_url(base);
    let err = provider.generate(&image_request()).await.unwrap_err();
    assert!(matches!(err, VocaError::ImageProvider(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind and drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = OpenAiProvider::new("sk".into())
        .with_base_url(format!("http://{addr}/v1"))
        .with_timeout_secs(5)
        .unwrap();
    let err = provider.generate(&image_request()).await.unwrap_err();
    assert!(matches!(err, VocaError::ImageProvider(_)));
}

#[tokio::test]
async fn test_configured_timeout_applies() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            Json(serde_json::json!({ "choices": [{ "message": { "content": "late" } }] }))
        }),
    );
    let base = serve(router).await;
    let provider = OpenAiProvider::new("sk".into())
        .with_base_url(base)
        .with_timeout_secs(1)
        .unwrap();

    let started = std::time::Instant::now();
    let err = provider
        .complete(&ChatRequest::new("gpt-4o-mini", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, VocaError::LlmProvider(_)));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}
