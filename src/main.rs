use axum::{Router, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pagegen_backend::config::AppConfig;
use pagegen_backend::cors::build_cors_layer;
use pagegen_backend::features::health::handler::health_check;
use pagegen_backend::features::{export, generate, imagegen, page};
use pagegen_backend::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        pagegen_backend::features::generate::handler::generate_page,
        pagegen_backend::features::page::handler::get_page,
        pagegen_backend::features::export::handler::export_image,
        pagegen_backend::features::imagegen::handler::generate_image,
        pagegen_backend::features::health::handler::health_check,
    ),
    components(
        schemas(
            pagegen_backend::error::ErrorBody,
            pagegen_backend::features::generate::models::TemplateInput,
            pagegen_backend::features::generate::models::ProductInputBase,
            pagegen_backend::features::generate::models::UploadedImage,
            pagegen_backend::features::generate::models::ImageMediaType,
            pagegen_backend::features::generate::models::Specification,
            pagegen_backend::features::generate::models::TrustData,
            pagegen_backend::features::generate::models::PolicyInfo,
            pagegen_backend::features::generate::models::CoupangInput,
            pagegen_backend::features::generate::models::ComparisonItem,
            pagegen_backend::features::generate::models::SmartstoreInput,
            pagegen_backend::features::generate::models::QaItem,
            pagegen_backend::features::generate::models::PremiumInput,
            pagegen_backend::features::generate::models::Endorsement,
            pagegen_backend::features::generate::models::VideoRef,
            pagegen_backend::features::generate::models::GenerateResponse,
            pagegen_backend::features::page::handler::PageResponse,
            pagegen_backend::features::export::handler::ExportRequest,
            pagegen_backend::features::imagegen::models::ImageGenRequest,
            pagegen_backend::features::imagegen::models::GeneratedImage,
            pagegen_backend::features::health::handler::HealthResponse,
        )
    ),
    tags(
        (name = "generate", description = "详情页生成"),
        (name = "page", description = "页面预览读取"),
        (name = "export", description = "整页 PNG 导出"),
        (name = "imagegen", description = "商品图片生成"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "PageGen Backend API",
        version = "0.1.0",
        description = "AI 상세페이지 생성 backend service (Axum)"
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagegen_backend=info,tower_http=info".into()),
        )
        .init();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    if config.generation.resolve_api_key().is_none() {
        tracing::warn!(
            "未配置 Anthropic API Key（config.toml 或 ANTHROPIC_API_KEY），/generate 将在调用时报错"
        );
    }

    let app_state = AppState::from_config(config);

    // Routes
    let api_router = Router::<AppState>::new()
        .merge(generate::create_generate_router())
        .merge(page::create_page_router())
        .merge(export::create_export_router())
        .merge(imagegen::create_imagegen_router());

    let mut app = Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest(&config.api.prefix, api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Generate API: http://{}{}/generate", addr, config.api.prefix);
    tracing::info!("Export API: http://{}{}/export-image", addr, config.api.prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        });

    tracing::info!("服务已退出");
}

/// 等待 Ctrl+C 或 SIGTERM，任一到达即触发优雅退出。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("监听 Ctrl+C 失败: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("监听 SIGTERM 失败: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("接收到退出信号，开始优雅退出...");
}
