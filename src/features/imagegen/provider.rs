use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ImageGenConfig;
use crate::error::AppError;
use crate::http;

use super::models::{GeneratedImage, Platform};

/// 生图平台统一使用 30s 超时的共享 Client。
fn client_30s() -> Result<&'static reqwest::Client, AppError> {
    http::client_timeout_30s()
        .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {}", e)))
}

/// 一次生图任务：平台 + 提示词 + 宽高比 + 调用方密钥。
#[derive(Debug, Clone)]
pub struct ImageGenJob {
    pub platform: Platform,
    pub prompt: String,
    pub aspect_ratio: String,
    pub api_key: String,
}

/// 三个生图平台的统一适配层。
///
/// 端点与 Replicate 轮询策略来自配置，测试时可指向 mock server 并把
/// 轮询间隔压到毫秒级。密钥由每个请求携带，服务端不保存。
pub struct ImageGenService {
    gemini_endpoint: String,
    replicate_endpoint: String,
    openai_endpoint: String,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

impl ImageGenService {
    pub fn new(cfg: &ImageGenConfig) -> Self {
        Self {
            gemini_endpoint: cfg.gemini_endpoint.trim_end_matches('/').to_string(),
            replicate_endpoint: cfg.replicate_endpoint.trim_end_matches('/').to_string(),
            openai_endpoint: cfg.openai_endpoint.trim_end_matches('/').to_string(),
            poll_interval: cfg.poll_interval(),
            poll_max_attempts: cfg.poll_max_attempts,
        }
    }

    pub async fn generate(&self, job: &ImageGenJob) -> Result<GeneratedImage, AppError> {
        info!(platform = job.platform.as_str(), "开始生成商品图片");
        match job.platform {
            Platform::Nanobanana => self.generate_with_gemini(job).await,
            Platform::Replicate => self.generate_with_replicate(job).await,
            Platform::GptImage1 => self.generate_with_openai(job).await,
        }
    }

    /// Gemini：单次同步调用，图片以 inlineData 内联返回。
    async fn generate_with_gemini(&self, job: &ImageGenJob) -> Result<GeneratedImage, AppError> {
        let url = format!(
            "{}/v1beta/models/gemini-2.5-flash-image:generateContent",
            self.gemini_endpoint
        );
        let body = json!({
            "contents": [{
                "parts": [{ "text": job.prompt }]
            }],
            "generationConfig": {
                "temperature": 0.8,
                "imageConfig": { "aspectRatio": job.aspect_ratio },
                "responseModalities": ["Image"]
            }
        });

        let resp = client_30s()?
            .post(&url)
            .header("x-goog-api-key", &job.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("Gemini API 오류: {text}")));
        }

        let parsed: GeminiResponse = resp.json().await?;
        let inline = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                AppError::Provider("Gemini로부터 이미지 데이터를 받지 못했습니다.".to_string())
            })?;

        Ok(GeneratedImage {
            base64: inline.data,
            media_type: inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
        })
    }

    /// Replicate：创建 prediction 后按固定间隔轮询至终态，成功态给出
    /// 输出图片 URL，需要二次拉取并转码为 base64。
    async fn generate_with_replicate(&self, job: &ImageGenJob) -> Result<GeneratedImage, AppError> {
        let url = format!(
            "{}/v1/models/black-forest-labs/flux-2-dev/predictions",
            self.replicate_endpoint
        );
        let body = json!({
            "input": {
                "prompt": job.prompt,
                "go_fast": true,
                "aspect_ratio": job.aspect_ratio,
                "input_images": [],
                "output_format": "jpg",
                "output_quality": 80
            }
        });

        let resp = client_30s()?
            .post(&url)
            .bearer_auth(&job.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("Replicate API 오류: {text}")));
        }

        let prediction: Value = resp.json().await?;
        let poll_url = prediction["urls"]["get"]
            .as_str()
            .ok_or_else(|| {
                AppError::Provider("Replicate prediction URL을 받지 못했습니다.".to_string())
            })?
            .to_string();

        for attempt in 1..=self.poll_max_attempts {
            tokio::time::sleep(self.poll_interval).await;

            let result: Value = client_30s()?
                .get(&poll_url)
                .bearer_auth(&job.api_key)
                .send()
                .await?
                .json()
                .await?;
            let status = result["status"].as_str().unwrap_or("");
            debug!(attempt, status, "Replicate 轮询");

            match status {
                "succeeded" => {
                    let output_url = result["output"][0].as_str().ok_or_else(|| {
                        AppError::Provider(
                            "Replicate로부터 이미지 URL을 받지 못했습니다.".to_string(),
                        )
                    })?;
                    return self.fetch_as_jpeg(output_url).await;
                }
                "failed" => {
                    let reason = result["error"].as_str().unwrap_or("알 수 없는 오류");
                    return Err(AppError::Provider(format!("Replicate 생성 실패: {reason}")));
                }
                // starting / processing，继续等
                _ => {}
            }
        }

        let budget_secs =
            self.poll_interval.as_millis() as u64 * u64::from(self.poll_max_attempts) / 1000;
        Err(AppError::Timeout(format!(
            "Replicate 이미지 생성 타임아웃 ({budget_secs}초 초과)"
        )))
    }

    /// 把 Replicate 的输出图片拉回来转成 base64（flux 输出为 jpg）。
    async fn fetch_as_jpeg(&self, url: &str) -> Result<GeneratedImage, AppError> {
        let resp = http::client_default()
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {}", e)))?
            .get(url)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Provider(
                "생성된 이미지를 다운로드하지 못했습니다.".to_string(),
            ));
        }
        let bytes = resp.bytes().await?;
        Ok(GeneratedImage {
            base64: BASE64.encode(&bytes),
            media_type: "image/jpeg".to_string(),
        })
    }

    /// OpenAI：宽高比先映射到离散尺寸档位，结果以 b64_json 返回。
    async fn generate_with_openai(&self, job: &ImageGenJob) -> Result<GeneratedImage, AppError> {
        let url = format!("{}/v1/images/generations", self.openai_endpoint);
        let body = json!({
            "model": "gpt-image-1",
            "prompt": job.prompt,
            "n": 1,
            "size": map_aspect_ratio_to_size(&job.aspect_ratio),
            "response_format": "b64_json"
        });

        let resp = client_30s()?
            .post(&url)
            .bearer_auth(&job.api_key)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!("OpenAI API 오류: {text}")));
        }

        let parsed: OpenAiImagesResponse = resp.json().await?;
        let b64 = parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| {
                AppError::Provider("OpenAI로부터 이미지 데이터를 받지 못했습니다.".to_string())
            })?;

        Ok(GeneratedImage {
            base64: b64,
            media_type: "image/png".to_string(),
        })
    }
}

/// gpt-image-1 只接受离散尺寸：方图 1024、横图 1536×1024、竖图 1024×1536。
/// 未知比例回退为方图。
pub fn map_aspect_ratio_to_size(aspect_ratio: &str) -> &'static str {
    match aspect_ratio {
        "1:1" => "1024x1024",
        "4:3" | "16:9" => "1536x1024",
        "3:4" | "9:16" => "1024x1536",
        _ => "1024x1024",
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(rename = "inlineData")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImagesResponse {
    #[serde(default)]
    data: Vec<OpenAiImageDatum>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageDatum {
    b64_json: Option<String>,
}
