use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 支持的生图平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Google Gemini 图像生成（gemini-2.5-flash-image）
    Nanobanana,
    /// Replicate 上的 FLUX.2 dev
    Replicate,
    /// OpenAI gpt-image-1
    GptImage1,
}

impl Platform {
    /// 平台名来自前端下拉框，未知值按参数错误处理而不是枚举反序列化失败。
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "nanobanana" => Some(Platform::Nanobanana),
            "replicate" => Some(Platform::Replicate),
            "gpt-image-1" => Some(Platform::GptImage1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Nanobanana => "nanobanana",
            Platform::Replicate => "replicate",
            Platform::GptImage1 => "gpt-image-1",
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenRequest {
    /// 平台标识：nanobanana / replicate / gpt-image-1
    #[serde(default)]
    pub platform: String,
    /// 图片描述提示词
    #[serde(default)]
    pub prompt: String,
    /// 宽高比（如 "1:1"、"4:3"），缺省 1:1
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    /// 调用方自带的平台 API 密钥，仅在本次请求内使用
    #[serde(default)]
    pub api_key: String,
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

/// 生图结果：统一为 base64 载荷 + 媒体类型，前端自行拼 data URL。
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub base64: String,
    /// image/png 或 image/jpeg，取决于平台
    pub media_type: String,
}
