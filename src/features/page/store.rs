use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;

/// 已发布页面条目：生成后不可变，重新生成总是产出新 id。
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub html: String,
    pub created_at: DateTime<Utc>,
}

/// 发布存储：进程级 id → 页面 TTL 缓存。
///
/// 生命周期：进程启动时按配置 TTL 构造一次，进程退出即全部丢失
/// （不做持久化是明确的非目标）。过期条目在读取时被视为不存在并被
/// 移除，没有显式删除接口。并发语义依赖 moka：不同 id 的写入互不
/// 冲突；同 id 覆盖写为 last-writer-wins（128 位随机 id 下实际不可达）。
#[derive(Clone)]
pub struct PageStore {
    cache: Cache<String, StoredPage>,
}

impl PageStore {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// 无条件写入（带当前时间戳）。
    pub async fn put(&self, id: String, html: String) {
        self.cache
            .insert(
                id,
                StoredPage {
                    html,
                    created_at: Utc::now(),
                },
            )
            .await;
    }

    /// 读取：不存在或已过期都返回 `None`，过期条目随读取被清除。
    pub async fn get(&self, id: &str) -> Option<StoredPage> {
        self.cache.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_document() {
        let store = PageStore::new(Duration::from_secs(3600));
        store
            .put("id-1".to_string(), "<html>테스트</html>".to_string())
            .await;

        let page = store.get("id-1").await.expect("entry exists");
        assert_eq!(page.html, "<html>테스트</html>");
        assert!(page.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn unknown_id_returns_none() {
        let store = PageStore::new(Duration::from_secs(3600));
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn entry_expires_after_ttl_and_stays_gone() {
        let store = PageStore::new(Duration::from_millis(50));
        store.put("id-1".to_string(), "<html></html>".to_string()).await;
        assert!(store.get("id-1").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        // 第一次读取观察到过期，条目被移除
        assert!(store.get("id-1").await.is_none());
        // 再次读取同样不存在（条目已消失而非“陈旧可见”）
        assert!(store.get("id-1").await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_id() {
        let store = PageStore::new(Duration::from_secs(3600));
        store.put("id-1".to_string(), "v1".to_string()).await;
        store.put("id-1".to_string(), "v2".to_string()).await;
        assert_eq!(store.get("id-1").await.expect("entry").html, "v2");
    }
}
