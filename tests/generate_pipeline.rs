//! 生成 → 发布 → 预览读取的端到端流程，模型侧用本地 mock server 替代。

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use pagegen_backend::config::AppConfig;
use pagegen_backend::features::{generate, page};
use pagegen_backend::state::AppState;

/// mock 端记录到的请求（headers + body），供断言用。
type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

#[derive(Clone)]
struct MockState {
    captured: Captured,
    status: StatusCode,
    reply: Value,
}

async fn messages_mock(
    State(mock): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.captured
        .lock()
        .expect("captured lock")
        .push((headers, body));
    (mock.status, Json(mock.reply.clone()))
}

/// 在 127.0.0.1 随机端口上起一个 Messages API mock，返回 base URL。
async fn spawn_messages_mock(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let mock_state = MockState {
        captured: captured.clone(),
        status,
        reply,
    };
    let app = Router::new()
        .route("/v1/messages", post(messages_mock))
        .with_state(mock_state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });
    (format!("http://{addr}"), captured)
}

fn build_app(endpoint: String) -> Router {
    let mut config = AppConfig::default();
    config.generation.endpoint = endpoint;
    config.generation.api_key = Some("sk-test".to_string());
    let state = AppState::from_config(&config);

    let api_router = Router::<AppState>::new()
        .merge(generate::create_generate_router())
        .merge(page::create_page_router());
    Router::<AppState>::new()
        .nest("/api", api_router)
        .with_state(state)
}

fn text_reply(text: &str) -> Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

async fn read_json(res: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn post_generate(app: &Router, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("oneshot")
}

#[tokio::test]
async fn generate_publishes_page_and_preview_returns_substituted_html() {
    let reply = "```html\n<!DOCTYPE html><html><body>\
                 <img src=\"[IMAGE_1]\"><h1>보온 텀블러</h1></body></html>\n```";
    let (endpoint, captured) = spawn_messages_mock(StatusCode::OK, text_reply(reply)).await;
    let app = build_app(endpoint);

    let body = json!({
        "template": "coupang",
        "productName": "보온 텀블러",
        "keySellingPoints": ["12시간 보온", "진공 단열"],
        "uploadedImages": [
            { "base64": "QUJD", "mediaType": "image/jpeg", "name": "main.jpg" }
        ],
        "rocketBadge": true
    });
    let res = post_generate(&app, body).await;
    assert_eq!(res.status(), StatusCode::OK);

    let v = read_json(res).await;
    let id = v["id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert_eq!(v["previewUrl"], format!("/preview/{id}"));

    // 预览读取：围栏已剥除、占位符已替换为 data URL
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/page/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("oneshot");
    assert_eq!(res.status(), StatusCode::OK);
    let page = read_json(res).await;
    let html = page["html"].as_str().expect("html");
    assert!(html.starts_with("<!DOCTYPE html>"), "got: {html}");
    assert!(html.contains("data:image/jpeg;base64,QUJD"));
    assert!(!html.contains("[IMAGE_1]"));
    assert!(!html.contains("```"));

    // mock 侧校验请求构造
    let reqs = captured.lock().expect("captured lock");
    assert_eq!(reqs.len(), 1);
    let (headers, body) = &reqs[0];
    assert_eq!(
        headers.get("x-api-key").and_then(|v| v.to_str().ok()),
        Some("sk-test")
    );
    assert_eq!(
        headers
            .get("anthropic-version")
            .and_then(|v| v.to_str().ok()),
        Some("2023-06-01")
    );
    assert_eq!(body["max_tokens"], 16000);
    // 模板风格指令进入 system prompt
    let system = body["system"].as_str().expect("system");
    assert!(system.contains("#cc0000"));
    // 图片块在前、文本块在后
    let content = body["messages"][0]["content"].as_array().expect("content");
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
    assert_eq!(content[1]["type"], "text");
}

#[tokio::test]
async fn empty_model_reply_is_500_and_nothing_is_published() {
    let (endpoint, _captured) =
        spawn_messages_mock(StatusCode::OK, json!({ "content": [] })).await;
    let app = build_app(endpoint);

    let res = post_generate(&app, json!({ "template": "premium", "productName": "시계" })).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = read_json(res).await;
    assert_eq!(v["error"], "AI가 응답을 생성하지 못했습니다.");
}

#[tokio::test]
async fn whitespace_only_model_reply_is_empty_generation() {
    let (endpoint, _captured) =
        spawn_messages_mock(StatusCode::OK, text_reply("   \n  ")).await;
    let app = build_app(endpoint);

    let res = post_generate(
        &app,
        json!({ "template": "smartstore", "productName": "수제 잼" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = read_json(res).await;
    assert_eq!(v["error"], "AI가 응답을 생성하지 못했습니다.");
}

#[tokio::test]
async fn upstream_failure_maps_to_500_envelope() {
    let (endpoint, _captured) = spawn_messages_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "type": "error", "error": { "message": "overloaded" } }),
    )
    .await;
    let app = build_app(endpoint);

    let res = post_generate(&app, json!({ "template": "coupang", "productName": "텀블러" })).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = read_json(res).await;
    let msg = v["error"].as_str().expect("error message");
    assert!(msg.contains("상위 API 오류"), "got: {msg}");
}

#[tokio::test]
async fn unfenced_reply_is_published_as_is() {
    let reply = "<!DOCTYPE html><html><body><h1>프리미엄 시계</h1></body></html>";
    let (endpoint, _captured) = spawn_messages_mock(StatusCode::OK, text_reply(reply)).await;
    let app = build_app(endpoint);

    let res = post_generate(&app, json!({ "template": "premium", "productName": "시계" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let v = read_json(res).await;
    let id = v["id"].as_str().expect("id");

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/page/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("oneshot");
    let page = read_json(res).await;
    assert_eq!(page["html"], reply);
}

/// 两次生成同一商品产出不同 id（再生成不覆盖旧页面）。
#[tokio::test]
async fn regeneration_yields_fresh_ids() {
    let reply = "<!DOCTYPE html><html><body>v</body></html>";
    let (endpoint, _captured) = spawn_messages_mock(StatusCode::OK, text_reply(reply)).await;
    let app = build_app(endpoint);

    let body = json!({ "template": "coupang", "productName": "텀블러" });
    let v1 = read_json(post_generate(&app, body.clone()).await).await;
    let v2 = read_json(post_generate(&app, body).await).await;
    assert_ne!(v1["id"], v2["id"]);
}
