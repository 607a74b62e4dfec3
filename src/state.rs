use std::sync::Arc;

use crate::config::AppConfig;
use crate::features::generate::client::ClaudeClient;
use crate::features::imagegen::provider::ImageGenService;
use crate::features::page::PageStore;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 已发布页面的 TTL 存储
    pub pages: PageStore,
    /// 详情页文案生成客户端（Anthropic Messages API）
    pub claude: Arc<ClaudeClient>,
    /// 生图平台适配层
    pub imagegen: Arc<ImageGenService>,
    /// 截图导出参数
    pub export: Arc<crate::config::ExportConfig>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pages: PageStore::new(config.store.ttl()),
            claude: Arc::new(ClaudeClient::new(&config.generation)),
            imagegen: Arc::new(ImageGenService::new(&config.imagegen)),
            export: Arc::new(config.export.clone()),
        }
    }
}
