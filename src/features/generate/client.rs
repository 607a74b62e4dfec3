use serde::Deserialize;
use serde_json::json;

use crate::config::GenerationConfig;
use crate::error::AppError;
use crate::http;

use super::models::UploadedImage;

/// Anthropic Messages API 客户端
///
/// 单次尝试：上游失败不在本层重试，错误原样上抛由接口边界转成终端错误。
#[derive(Clone)]
pub struct ClaudeClient {
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
}

impl ClaudeClient {
    pub fn new(cfg: &GenerationConfig) -> Self {
        Self {
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            api_key: cfg.resolve_api_key(),
        }
    }

    /// 发送 (system, user, images) 并取回第一个文本块。
    ///
    /// 失败语义：
    /// - 凭证缺失 → `Configuration`（在发起请求前判定）；
    /// - 上游非 2xx → `Upstream`，携带上游状态码与响应体；
    /// - 响应中没有文本块 → `EmptyGeneration`。
    pub async fn generate_page(
        &self,
        system: &str,
        user: &str,
        images: &[UploadedImage],
    ) -> Result<String, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("ANTHROPIC_API_KEY가 설정되지 않았습니다.".to_string())
        })?;

        // 图片块在前、文本块在后，与提示词里的 [IMAGE_n] 编号顺序一致。
        let mut content: Vec<serde_json::Value> = images
            .iter()
            .map(|img| {
                json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": img.media_type.as_str(),
                        "data": img.base64,
                    }
                })
            })
            .collect();
        content.push(json!({ "type": "text", "text": user }));

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": content }],
        });

        let client = http::client_timeout_120s()
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {}", e)))?;

        tracing::debug!(model = %self.model, images = images.len(), "调用 Messages API");

        let resp = client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body 읽기 실패>".to_string());
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse = resp.json().await.map_err(|e| AppError::Upstream {
            status: status.as_u16(),
            body: format!("응답 파싱 실패: {}", e),
        })?;

        match parsed.content.first() {
            Some(ContentBlock::Text { text }) if !text.trim().is_empty() => Ok(text.clone()),
            _ => Err(AppError::EmptyGeneration),
        }
    }
}

/// 剥除模型偶尔包裹的 markdown 代码围栏。
///
/// 提示词已明确禁止代码块，但模型不可完全信任：这里各剥一次
/// 开头/结尾的围栏行（语言标签大小写不敏感），随后去除首尾空白。
/// 只剥一层，嵌套围栏属于文档内容，原样保留。
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();

    if let Some(rest) = s.strip_prefix("```") {
        let line_end = rest.find('\n').map(|i| i + 1).unwrap_or(rest.len());
        let tag = rest[..line_end].trim();
        // 仅当围栏行是裸 ``` 或 ```<语言标签> 时才剥除
        if tag.is_empty() || tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            s = &rest[line_end..];
        }
    }

    let trimmed = s.trim_end();
    if let Some(body) = trimmed.strip_suffix("```") {
        s = body;
    }

    s.trim()
}

// --- Response Parsing ---

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::strip_code_fences;

    #[test]
    fn strips_tagged_fence_pair_exactly_once() {
        let raw = "```html\n<!DOCTYPE html><html></html>\n```";
        assert_eq!(strip_code_fences(raw), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn fence_tag_match_is_case_insensitive() {
        let raw = "```HTML\n<p>안녕</p>\n```";
        assert_eq!(strip_code_fences(raw), "<p>안녕</p>");
    }

    #[test]
    fn unfenced_input_only_gets_trimmed() {
        let raw = "  \n<!DOCTYPE html><html></html>\n  ";
        assert_eq!(strip_code_fences(raw), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn inner_fences_survive_single_strip() {
        let raw = "```\n코드 예시: ```js\nalert(1)\n```";
        let out = strip_code_fences(raw);
        assert!(out.contains("```js"));
        assert!(!out.starts_with("```\n"));
    }

    #[test]
    fn bare_fence_pair_collapses_to_empty() {
        assert_eq!(strip_code_fences("```"), "");
        assert_eq!(strip_code_fences("```\n```"), "");
    }
}
