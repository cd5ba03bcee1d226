//! HTTP API integration tests: every endpoint against mock providers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use voca_config::ServerConfig;
use voca_core::NewSkill;
use voca_forge::{Forge, ForgeSettings, RetryPolicy};
use voca_llm::{MockChat, MockImage, MockImages};
use voca_store::SkillStore;

const PNG_B64: &str = "iVBORw0KGgo=";

const APPLE_SKILL: &str = r#"{"name":"Apple Meteor","description":"사과가 비처럼 쏟아진다.","damage":"45","image_desc":"red apples falling"}"#;

struct TestApp {
    router: axum::Router,
    chat: MockChat,
    images: MockImages,
    store: SkillStore,
}

fn setup(chat: MockChat, images: MockImages) -> TestApp {
    let store = SkillStore::open_in_memory().unwrap();
    let settings = ForgeSettings {
        retry: RetryPolicy {
            backoff: Duration::ZERO,
            ..RetryPolicy::default()
        },
        ..ForgeSettings::default()
    };
    let forge = Forge::with_providers(
        Arc::new(chat.clone()),
        Arc::new(images.clone()),
        store.clone(),
        settings,
    );
    let router = voca_server::build_router(ServerConfig::default(), forge);
    TestApp {
        router,
        chat,
        images,
        store,
    }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper to read the full body bytes from a response.
async fn body_string(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

// ── Health & Metrics ───────────────────────────────────────────

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["skills"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(ct.starts_with("text/plain"));
    let body = body_string(resp).await;
    assert!(body.contains("voca_http_requests_total 1"));
    assert!(body.contains("voca_skills_total{origin=\"created\"} 0"));
}

// ── Skills ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_skill() {
    let app = setup(
        MockChat::new().with_response(APPLE_SKILL),
        MockImages::new().with_outcome(MockImage::Success(PNG_B64.into())),
    );
    let resp = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple", "meaningKo": "사과" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["word"], "apple");
    assert_eq!(json["name"], "Apple Meteor");
    assert_eq!(json["damage"], 45);
    assert_eq!(json["imageDesc"], "red apples falling");
    assert_eq!(json["imageBase64"], PNG_B64);
    assert_eq!(json["imageStatus"], "SUCCESS");
    assert!(json["imageError"].is_null());
    assert!(json["id"].is_i64());
    assert!(json.get("origin").is_none());

    // Second request is a cache read
    let resp = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple", "meaningKo": "사과" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.chat.call_count(), 1);
    assert_eq!(app.images.call_count(), 1);

    let resp = app
        .router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_string(resp).await;
    assert!(body.contains("voca_skills_total{origin=\"created\"} 1"));
    assert!(body.contains("voca_skills_total{origin=\"cached\"} 1"));
    assert!(body.contains("voca_images_total{status=\"success\"} 1"));
}

#[tokio::test]
async fn test_generate_skill_image_failure_is_ok() {
    let app = setup(
        MockChat::new().with_response(APPLE_SKILL),
        MockImages::new().with_outcome(MockImage::Transport("connection refused".into())),
    );
    let resp = app
        .router
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple", "meaningKo": "사과" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["imageStatus"], "FAILED");
    assert!(json["imageBase64"].is_null());
    assert!(json["imageError"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_generate_skill_blank_word() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "  ", "meaningKo": "사과" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("word"));
    assert_eq!(app.chat.call_count(), 0);
}

#[tokio::test]
async fn test_generate_skill_blank_meaning() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple", "meaningKo": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_skill_missing_field() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_generate_skill_upstream_error() {
    let app = setup(
        MockChat::new().with_error("HTTP 401: invalid api key"),
        MockImages::new(),
    );
    let resp = app
        .router
        .oneshot(post_json(
            "/api/skills/generate",
            serde_json::json!({ "word": "apple", "meaningKo": "사과" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("invalid api key"));
    assert_eq!(app.store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_get_skill() {
    let app = setup(MockChat::new(), MockImages::new());
    let saved = app
        .store
        .insert(&NewSkill {
            word: "apple".into(),
            name: "Apple Meteor".into(),
            description: "d".into(),
            damage: 45,
            image_desc: "i".into(),
        })
        .unwrap();
    app.store.update_image(saved.id, PNG_B64).unwrap();

    let resp = app
        .router
        .oneshot(Request::get("/api/skills/apple").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["id"], saved.id);
    assert_eq!(json["imageStatus"], "SUCCESS");
    assert_eq!(app.chat.call_count(), 0);
    assert_eq!(app.images.call_count(), 0);
}

#[tokio::test]
async fn test_get_skill_not_found() {
    let app = setup(MockChat::new(), MockImages::new());
    let resp = app
        .router
        .clone()
        .oneshot(Request::get("/api/skills/pear").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("pear"));

    let resp = app
        .router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(body_string(resp).await.contains("voca_http_errors_total 1"));
}

// ── Translation ────────────────────────────────────────────────

#[tokio::test]
async fn test_translation_question() {
    let app = setup(
        MockChat::new().with_response(
            r#"{"korean_sentence":"사과가 맛있다.","ideal_translation":"The apple is delicious.","word_hint":"apple"}"#,
        ),
        MockImages::new(),
    );
    let resp = app
        .router
        .oneshot(post_json(
            "/api/translation/question",
            serde_json::json!({ "targetWord": "apple", "userLevel": "beginner" }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["koreanSentence"], "사과가 맛있다.");
    assert_eq!(json["targetWord"], "apple");
    assert_eq!(json["wordHint"], "apple");
    assert_eq!(json["ideal"], "The apple is delicious.");
}

#[tokio::test]
async fn test_translation_evaluate() {
    let app = setup(
        MockChat::new().with_response(
            r#"{"score":90,"breakdown":{"meaning":40,"grammar":22,"word_usage":18,"naturalness":10},"feedback":"좋아요","correction":null}"#,
        ),
        MockImages::new(),
    );
    let resp = app
        .router
        .oneshot(post_json(
            "/api/translation/evaluate",
            serde_json::json!({
                "koreanSentence": "사과가 맛있다.",
                "userAnswer": "Apple is delicious.",
                "idealTranslation": "The apple is delicious.",
                "targetWord": "apple"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["score"], 90);
    assert_eq!(json["breakdown"]["grammar"], 22);
    assert!(json["correction"].is_null());
    assert_eq!(json["idealAnswer"], "The apple is delicious.");
}

#[tokio::test]
async fn test_translation_evaluate_malformed_reply() {
    let app = setup(MockChat::new().with_response("not json"), MockImages::new());
    let resp = app
        .router
        .oneshot(post_json(
            "/api/translation/evaluate",
            serde_json::json!({
                "koreanSentence": "사과가 맛있다.",
                "userAnswer": "Apple is delicious.",
                "idealTranslation": "The apple is delicious.",
                "targetWord": "apple"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}
