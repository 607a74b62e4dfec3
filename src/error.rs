use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
///
/// 所有 handler 返回 `Result<_, AppError>`，错误在接口边界统一映射为
/// `{"error": "..."}` JSON 信封与对应状态码，不向上层抛出未捕获错误。
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数校验错误（缺少必填字段等，调用方可修正后重试）
    #[error("{0}")]
    Validation(String),

    /// 资源不存在或已过期
    #[error("{0}")]
    NotFound(String),

    /// 服务端凭证缺失（需要运维介入，调用方无法恢复）
    #[error("{0}")]
    Configuration(String),

    /// 模型未返回任何文本内容，或清洗后为空
    #[error("AI가 응답을 생성하지 못했습니다.")]
    EmptyGeneration,

    /// 上游 API 返回非成功状态（携带上游状态码与响应体）
    #[error("상위 API 오류 (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    /// 轮询达到次数上限仍未到达终态
    #[error("{0}")]
    Timeout(String),

    /// 图片生成平台返回的业务失败（消息原样透传给前端）
    #[error("{0}")]
    Provider(String),

    /// 渲染引擎启动/加载/截图失败
    #[error("이미지 생성 중 오류가 발생했습니다: {0}")]
    Resource(String),

    /// 内部服务器错误
    #[error("내부 오류: {0}")]
    Internal(String),
}

/// 对外错误信封：固定为 `{"error": string}`，与前端约定保持一致。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 人类可读错误信息（韩文，面向最终用户展示）
    #[schema(example = "페이지를 찾을 수 없습니다.")]
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_)
            | AppError::EmptyGeneration
            | AppError::Upstream { .. }
            | AppError::Timeout(_)
            | AppError::Provider(_)
            | AppError::Resource(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 稳定错误码，仅用于日志检索，不进入响应体。
    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Configuration(_) => "CONFIGURATION_MISSING",
            AppError::EmptyGeneration => "EMPTY_GENERATION",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::Timeout(_) => "UPSTREAM_TIMEOUT",
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::Resource(_) => "CAPTURE_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code = self.stable_code(), "请求处理失败: {}", message);
        } else {
            tracing::debug!(code = self.stable_code(), "请求被拒绝: {}", message);
        }

        let mut res = Json(ErrorBody { error: message }).into_response();
        *res.status_mut() = status;
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("상위 요청 시간 초과: {}", err))
        } else {
            AppError::Upstream {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                body: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON 처리 오류: {}", err))
    }
}
