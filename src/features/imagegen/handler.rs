use axum::{Json, Router, extract::State, routing::post};

use crate::error::AppError;
use crate::state::AppState;

use super::models::{GeneratedImage, ImageGenRequest, Platform};
use super::provider::ImageGenJob;

pub fn create_imagegen_router() -> Router<AppState> {
    Router::<AppState>::new().route("/generate-image", post(generate_image))
}

/// 调用所选平台生成一张商品图片
///
/// 校验顺序固定：提示词 → API 密钥 → 平台名，前端按第一条错误提示用户。
#[utoipa::path(
    post,
    path = "/generate-image",
    tag = "imagegen",
    request_body = ImageGenRequest,
    responses(
        (status = 200, description = "生成成功", body = GeneratedImage),
        (status = 400, description = "参数缺失或平台不支持", body = crate::error::ErrorBody),
        (status = 500, description = "平台调用失败或轮询超时", body = crate::error::ErrorBody),
    )
)]
pub async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<ImageGenRequest>,
) -> Result<Json<GeneratedImage>, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(AppError::Validation("프롬프트를 입력해주세요.".to_string()));
    }
    if req.api_key.trim().is_empty() {
        return Err(AppError::Validation("API 키를 입력해주세요.".to_string()));
    }
    let platform = Platform::parse(&req.platform)
        .ok_or_else(|| AppError::Validation("지원하지 않는 플랫폼입니다.".to_string()))?;

    let job = ImageGenJob {
        platform,
        prompt: req.prompt,
        aspect_ratio: req.aspect_ratio,
        api_key: req.api_key,
    };
    let image = state.imagegen.generate(&job).await?;
    Ok(Json(image))
}
