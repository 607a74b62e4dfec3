use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

use super::capture::capture_full_page;

pub fn create_export_router() -> Router<AppState> {
    Router::<AppState>::new().route("/export-image", post(export_image))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// 生成时返回的页面 id
    #[serde(default)]
    pub id: Option<String>,
}

/// ASCII 回退文件名 + RFC 5987 编码的韩文文件名（상세페이지.png）
const CONTENT_DISPOSITION: &str = "attachment; filename=\"detail-page.png\"; \
     filename*=UTF-8''%EC%83%81%EC%84%B8%ED%8E%98%EC%9D%B4%EC%A7%80.png";

/// 把已发布页面导出为整页 PNG 下载
///
/// 存储查找在浏览器启动之前完成，id 不存在时不会产生任何渲染开销。
#[utoipa::path(
    post,
    path = "/export-image",
    tag = "export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "PNG 附件下载", body = Vec<u8>, content_type = "image/png"),
        (status = 400, description = "缺少 id", body = crate::error::ErrorBody),
        (status = 404, description = "页面不存在或已过期", body = crate::error::ErrorBody),
        (status = 500, description = "渲染或截图失败", body = crate::error::ErrorBody),
    )
)]
pub async fn export_image(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let id = req
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("페이지 ID가 필요합니다.".to_string()))?;

    let page = state
        .pages
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound("페이지를 찾을 수 없습니다.".to_string()))?;

    info!(id = %id, "开始导出整页 PNG");
    let png = capture_full_page(&page.html, &state.export).await?;
    info!(id = %id, bytes = png.len(), "整页 PNG 导出完成");

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(CONTENT_DISPOSITION),
        ),
    ];
    Ok((headers, png).into_response())
}
