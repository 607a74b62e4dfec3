use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（作为 RUST_LOG 缺省值）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "pagegen_backend=info,tower_http=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default = "CorsConfig::default_allow_credentials")]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        false
    }

    fn default_allow_credentials() -> bool {
        false
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: Self::default_allow_credentials(),
            max_age_secs: None,
        }
    }
}

/// 文案生成（Anthropic Messages API）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API Base URL（测试时可指向 mock server）
    #[serde(default = "GenerationConfig::default_endpoint")]
    pub endpoint: String,
    /// 模型名
    #[serde(default = "GenerationConfig::default_model")]
    pub model: String,
    /// 单次生成的最大 token 数（完整详情页 HTML 较长，需要足够余量）
    #[serde(default = "GenerationConfig::default_max_tokens")]
    pub max_tokens: u32,
    /// API Key；留空则回退到 ANTHROPIC_API_KEY 环境变量。
    /// 两者都缺失时仅在发起生成请求时报错（fail fast，不阻断进程启动）。
    #[serde(default)]
    pub api_key: Option<String>,
}

impl GenerationConfig {
    fn default_endpoint() -> String {
        "https://api.anthropic.com".to_string()
    }

    fn default_model() -> String {
        "claude-sonnet-4-20250514".to_string()
    }

    fn default_max_tokens() -> u32 {
        16_000
    }

    /// 解析生效的 API Key：配置文件优先，其次环境变量。
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            api_key: None,
        }
    }
}

/// 发布存储配置（进程内 TTL 缓存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 页面保留时长（秒），过期后读取视为不存在
    #[serde(default = "StoreConfig::default_ttl_secs")]
    pub ttl_secs: u64,
}

impl StoreConfig {
    fn default_ttl_secs() -> u64 {
        60 * 60
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Self::default_ttl_secs(),
        }
    }
}

/// 整页截图导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 视口宽度（移动端优先布局按 600px 生成）
    #[serde(default = "ExportConfig::default_viewport_width")]
    pub viewport_width: u32,
    /// 首次渲染用的初始视口高度，量高后会被真实高度替换
    #[serde(default = "ExportConfig::default_initial_height")]
    pub initial_height: u32,
    /// 像素密度（2x 保证导出清晰度）
    #[serde(default = "ExportConfig::default_device_scale_factor")]
    pub device_scale_factor: f64,
    /// 量高前等待 onload 动画/布局稳定的时间（毫秒）
    #[serde(default = "ExportConfig::default_settle_ms")]
    pub settle_ms: u64,
    /// Chrome/Chromium 可执行文件路径，留空则使用系统默认查找
    #[serde(default)]
    pub chrome_path: Option<String>,
}

impl ExportConfig {
    fn default_viewport_width() -> u32 {
        600
    }

    fn default_initial_height() -> u32 {
        800
    }

    fn default_device_scale_factor() -> f64 {
        2.0
    }

    fn default_settle_ms() -> u64 {
        1500
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            viewport_width: Self::default_viewport_width(),
            initial_height: Self::default_initial_height(),
            device_scale_factor: Self::default_device_scale_factor(),
            settle_ms: Self::default_settle_ms(),
            chrome_path: None,
        }
    }
}

/// 图片生成平台配置（端点可覆盖以便测试指向 mock server）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenConfig {
    /// Gemini（나노바나나）端点
    #[serde(default = "ImageGenConfig::default_gemini_endpoint")]
    pub gemini_endpoint: String,
    /// Replicate 端点
    #[serde(default = "ImageGenConfig::default_replicate_endpoint")]
    pub replicate_endpoint: String,
    /// OpenAI 端点
    #[serde(default = "ImageGenConfig::default_openai_endpoint")]
    pub openai_endpoint: String,
    /// Replicate 轮询间隔（毫秒）。固定间隔轮询，不做指数退避，
    /// 保证最坏耗时可预期（interval × attempts）。
    #[serde(default = "ImageGenConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Replicate 轮询次数上限
    #[serde(default = "ImageGenConfig::default_poll_max_attempts")]
    pub poll_max_attempts: u32,
}

impl ImageGenConfig {
    fn default_gemini_endpoint() -> String {
        "https://generativelanguage.googleapis.com".to_string()
    }

    fn default_replicate_endpoint() -> String {
        "https://api.replicate.com".to_string()
    }

    fn default_openai_endpoint() -> String {
        "https://api.openai.com".to_string()
    }

    fn default_poll_interval_ms() -> u64 {
        2000
    }

    fn default_poll_max_attempts() -> u32 {
        25
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            gemini_endpoint: Self::default_gemini_endpoint(),
            replicate_endpoint: Self::default_replicate_endpoint(),
            openai_endpoint: Self::default_openai_endpoint(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            poll_max_attempts: Self::default_poll_max_attempts(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 文案生成配置
    #[serde(default)]
    pub generation: GenerationConfig,
    /// 发布存储配置
    #[serde(default)]
    pub store: StoreConfig,
    /// 截图导出配置
    #[serde(default)]
    pub export: ExportConfig,
    /// 图片生成平台配置
    #[serde(default)]
    pub imagegen: ImageGenConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        tracing::info!("正在从 config.toml 加载配置文件");

        let builder = ConfigBuilder::builder()
            // 配置文件可省略，所有字段都有 serde 默认值
            .add_source(File::with_name("config").required(false))
            // 支持环境变量覆盖，例如：APP_SERVER_PORT
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
