use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;

/// 全局复用的 HTTP Client（统一连接池/Keep-Alive），避免每次请求重复创建。
///
/// 说明：
/// - 不同上游的耗时特征差异很大：图片生成平台的单次调用在 30s 内可完成，
///   而文案生成（整页 HTML）可能接近两分钟，这里按 timeout 维度拆分 client。
/// - `Client` 本身是线程安全的，适合全局复用。
static CLIENT_DEFAULT: OnceCell<Client> = OnceCell::new();
static CLIENT_TIMEOUT_30S: OnceCell<Client> = OnceCell::new();
static CLIENT_TIMEOUT_120S: OnceCell<Client> = OnceCell::new();

/// 默认配置的 HTTP Client（不额外设置 timeout），用于下载生成产物等辅助请求。
pub fn client_default() -> Result<&'static Client, reqwest::Error> {
    CLIENT_DEFAULT.get_or_try_init(|| Client::builder().build())
}

/// timeout=30s 的 HTTP Client，用于图片生成平台的单次调用与轮询。
pub fn client_timeout_30s() -> Result<&'static Client, reqwest::Error> {
    CLIENT_TIMEOUT_30S
        .get_or_try_init(|| Client::builder().timeout(Duration::from_secs(30)).build())
}

/// timeout=120s 的 HTTP Client，用于整页文案生成这类长请求。
pub fn client_timeout_120s() -> Result<&'static Client, reqwest::Error> {
    CLIENT_TIMEOUT_120S
        .get_or_try_init(|| Client::builder().timeout(Duration::from_secs(120)).build())
}
