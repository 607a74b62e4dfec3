use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

pub fn create_page_router() -> Router<AppState> {
    Router::<AppState>::new().route("/page/:id", get(get_page))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse {
    /// 已发布的完整 HTML 文档
    pub html: String,
}

/// 按 id 取回已发布的页面 HTML
///
/// 不存在与已过期对外不可区分，统一返回 404。
#[utoipa::path(
    get,
    path = "/page/{id}",
    tag = "page",
    params(("id" = String, Path, description = "生成时返回的页面 id")),
    responses(
        (status = 200, description = "页面存在", body = PageResponse),
        (status = 404, description = "页面不存在或已过期", body = crate::error::ErrorBody),
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PageResponse>, AppError> {
    let page = state
        .pages
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound("페이지를 찾을 수 없습니다.".to_string()))?;

    Ok(Json(PageResponse { html: page.html }))
}
