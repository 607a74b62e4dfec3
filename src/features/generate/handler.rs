use axum::{Json, Router, extract::State, routing::post};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

use super::client::strip_code_fences;
use super::models::{GenerateResponse, TemplateInput};
use super::placeholder::substitute_placeholders;
use super::prompt::{build_system_prompt, build_user_prompt};

pub fn create_generate_router() -> Router<AppState> {
    Router::<AppState>::new().route("/generate", post(generate_page))
}

/// 生成商品详情页 HTML 并发布到预览存储
///
/// 流水线：校验 → 组装提示词 → 调用模型 → 清洗围栏 → 回填图片占位符
/// → 分配 id → 写入存储。任意一步失败整个请求失败，不会发布半成品。
#[utoipa::path(
    post,
    path = "/generate",
    tag = "generate",
    request_body = TemplateInput,
    responses(
        (status = 200, description = "生成成功，返回页面 id 与预览路径", body = GenerateResponse),
        (status = 400, description = "缺少必填字段", body = crate::error::ErrorBody),
        (status = 500, description = "模型调用失败或返回为空", body = crate::error::ErrorBody),
    )
)]
pub async fn generate_page(
    State(state): State<AppState>,
    Json(input): Json<TemplateInput>,
) -> Result<Json<GenerateResponse>, AppError> {
    if input.base().product_name.trim().is_empty() {
        return Err(AppError::Validation("제품명을 입력해주세요.".to_string()));
    }

    let images = &input.base().uploaded_images;
    info!(
        template = input.template_name(),
        images = images.len(),
        "开始生成详情页: {}",
        input.base().product_name
    );

    let system = build_system_prompt(&input);
    let user = build_user_prompt(&input);
    let raw = state.claude.generate_page(&system, &user, images).await?;

    let html = strip_code_fences(&raw);
    if html.is_empty() {
        return Err(AppError::EmptyGeneration);
    }
    let html = substitute_placeholders(html, images);

    let id = Uuid::new_v4().to_string();
    state.pages.put(id.clone(), html).await;
    info!(id = %id, "详情页已发布");

    Ok(Json(GenerateResponse {
        preview_url: format!("/preview/{id}"),
        id,
    }))
}
