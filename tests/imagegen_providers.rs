//! 三个生图平台适配层的行为测试，平台 API 全部用本地 mock server 替代。

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde_json::{Value, json};

use pagegen_backend::config::ImageGenConfig;
use pagegen_backend::error::AppError;
use pagegen_backend::features::imagegen::models::Platform;
use pagegen_backend::features::imagegen::provider::{ImageGenJob, ImageGenService};

fn test_config(endpoint: &str) -> ImageGenConfig {
    ImageGenConfig {
        gemini_endpoint: endpoint.to_string(),
        replicate_endpoint: endpoint.to_string(),
        openai_endpoint: endpoint.to_string(),
        // 测试里把轮询预算压到毫秒级
        poll_interval_ms: 5,
        poll_max_attempts: 3,
    }
}

fn job(platform: Platform) -> ImageGenJob {
    ImageGenJob {
        platform,
        prompt: "미니멀한 배경의 흰색 텀블러 제품 사진".to_string(),
        aspect_ratio: "1:1".to_string(),
        api_key: "platform-key".to_string(),
    }
}

/// 先 bind 再建路由：poll/output URL 必须是绝对地址，路由需要知道自己的 base。
async fn spawn_mock<F>(build: F) -> String
where
    F: FnOnce(String) -> Router,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let base = format!("http://{}", listener.local_addr().expect("mock addr"));
    let app = build(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });
    base
}

// ---------- Gemini (나노바나나) ----------

type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

#[derive(Clone)]
struct GeminiMock {
    captured: Captured,
    reply: Value,
}

async fn gemini_handler(
    State(mock): State<GeminiMock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.captured
        .lock()
        .expect("captured lock")
        .push((headers, body));
    Json(mock.reply.clone())
}

fn gemini_router(reply: Value, captured: Captured) -> Router {
    Router::new()
        // 实际请求路径是 /v1beta/models/gemini-2.5-flash-image:generateContent，
        // 冒号在 axum 路由语法里有含义，这里用参数段兜住整个末段
        .route("/v1beta/models/:model", post(gemini_handler))
        .with_state(GeminiMock { captured, reply })
}

#[tokio::test]
async fn gemini_inline_data_becomes_generated_image() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let reply = json!({
        "candidates": [{
            "content": {
                "parts": [{ "inlineData": { "data": "SU1H", "mimeType": "image/png" } }]
            }
        }]
    });
    let c = captured.clone();
    let base = spawn_mock(move |_| gemini_router(reply, c)).await;

    let service = ImageGenService::new(&test_config(&base));
    let image = service
        .generate(&job(Platform::Nanobanana))
        .await
        .expect("generate");
    assert_eq!(image.base64, "SU1H");
    assert_eq!(image.media_type, "image/png");

    let reqs = captured.lock().expect("captured lock");
    assert_eq!(reqs.len(), 1);
    let (headers, body) = &reqs[0];
    assert_eq!(
        headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()),
        Some("platform-key")
    );
    assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
}

#[tokio::test]
async fn gemini_text_only_reply_is_provider_error() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let reply = json!({
        "candidates": [{ "content": { "parts": [{ "text": "죄송합니다" }] } }]
    });
    let base = spawn_mock(move |_| gemini_router(reply, captured)).await;

    let service = ImageGenService::new(&test_config(&base));
    let err = service
        .generate(&job(Platform::Nanobanana))
        .await
        .expect_err("expected failure");
    assert!(matches!(err, AppError::Provider(_)), "got: {err:?}");
    assert_eq!(err.to_string(), "Gemini로부터 이미지 데이터를 받지 못했습니다.");
}

// ---------- Replicate ----------

#[derive(Clone)]
struct ReplicateMock {
    base: String,
    polls: Arc<AtomicU32>,
    /// 轮询几次后进入终态；u32::MAX 表示永远 processing
    succeed_after: u32,
    fail: bool,
}

async fn replicate_create(State(mock): State<ReplicateMock>) -> Json<Value> {
    Json(json!({ "id": "pred-1", "urls": { "get": format!("{}/poll", mock.base) } }))
}

async fn replicate_poll(State(mock): State<ReplicateMock>) -> Json<Value> {
    let n = mock.polls.fetch_add(1, Ordering::SeqCst) + 1;
    if mock.fail {
        return Json(json!({ "status": "failed", "error": "NSFW content detected" }));
    }
    if n >= mock.succeed_after {
        Json(json!({
            "status": "succeeded",
            "output": [format!("{}/file.jpg", mock.base)]
        }))
    } else {
        Json(json!({ "status": "processing" }))
    }
}

async fn replicate_file() -> &'static [u8] {
    b"JPEGDATA"
}

fn replicate_router(base: String, succeed_after: u32, fail: bool) -> Router {
    let mock = ReplicateMock {
        base,
        polls: Arc::new(AtomicU32::new(0)),
        succeed_after,
        fail,
    };
    Router::new()
        .route(
            "/v1/models/black-forest-labs/flux-2-dev/predictions",
            post(replicate_create),
        )
        .route("/poll", get(replicate_poll))
        .route("/file.jpg", get(replicate_file))
        .with_state(mock)
}

#[tokio::test]
async fn replicate_polls_until_succeeded_and_reencodes_output() {
    let base = spawn_mock(|base| replicate_router(base, 2, false)).await;

    let service = ImageGenService::new(&test_config(&base));
    let image = service
        .generate(&job(Platform::Replicate))
        .await
        .expect("generate");
    // b"JPEGDATA" 的 base64
    assert_eq!(image.base64, "SlBFR0RBVEE=");
    assert_eq!(image.media_type, "image/jpeg");
}

#[tokio::test]
async fn replicate_failed_status_carries_platform_reason() {
    let base = spawn_mock(|base| replicate_router(base, u32::MAX, true)).await;

    let service = ImageGenService::new(&test_config(&base));
    let err = service
        .generate(&job(Platform::Replicate))
        .await
        .expect_err("expected failure");
    assert!(matches!(err, AppError::Provider(_)), "got: {err:?}");
    assert_eq!(err.to_string(), "Replicate 생성 실패: NSFW content detected");
}

#[tokio::test]
async fn replicate_poll_budget_exhaustion_is_timeout() {
    let base = spawn_mock(|base| replicate_router(base, u32::MAX, false)).await;

    let service = ImageGenService::new(&test_config(&base));
    let err = service
        .generate(&job(Platform::Replicate))
        .await
        .expect_err("expected timeout");
    assert!(matches!(err, AppError::Timeout(_)), "got: {err:?}");
    assert!(err.to_string().contains("타임아웃"), "got: {err}");
}

// ---------- OpenAI (gpt-image-1) ----------

#[derive(Clone)]
struct OpenAiMock {
    captured: Captured,
}

async fn openai_handler(
    State(mock): State<OpenAiMock>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.captured
        .lock()
        .expect("captured lock")
        .push((headers, body));
    Json(json!({ "data": [{ "b64_json": "T1BFTkFJ" }] }))
}

#[tokio::test]
async fn openai_maps_aspect_ratio_to_size_and_returns_png() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let c = captured.clone();
    let base = spawn_mock(move |_| {
        Router::new()
            .route("/v1/images/generations", post(openai_handler))
            .with_state(OpenAiMock { captured: c })
    })
    .await;

    let service = ImageGenService::new(&test_config(&base));
    let mut wide = job(Platform::GptImage1);
    wide.aspect_ratio = "16:9".to_string();
    let image = service.generate(&wide).await.expect("generate");
    assert_eq!(image.base64, "T1BFTkFJ");
    assert_eq!(image.media_type, "image/png");

    let reqs = captured.lock().expect("captured lock");
    assert_eq!(reqs.len(), 1);
    let (headers, body) = &reqs[0];
    assert_eq!(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer platform-key")
    );
    assert_eq!(body["model"], "gpt-image-1");
    assert_eq!(body["size"], "1536x1024");
    assert_eq!(body["response_format"], "b64_json");
}
