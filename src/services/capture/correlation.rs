//! 请求关联存储
//!
//! 请求发起时写入，完成时取出并生成日志，失败时丢弃。

use std::collections::HashMap;

use crate::models::PendingRequest;

/// 以请求 ID 为键的待完成请求表
#[derive(Debug, Default)]
pub struct CorrelationStore {
    pending: HashMap<String, PendingRequest>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或覆盖，返回被覆盖的旧条目
    ///
    /// 同一请求 ID 重复出现时以最新一次为准（现有行为，可能导致少计一次请求）。
    pub fn put(&mut self, id: impl Into<String>, entry: PendingRequest) -> Option<PendingRequest> {
        let id = id.into();
        let previous = self.pending.insert(id.clone(), entry);
        if previous.is_some() {
            tracing::warn!(request_id = %id, "请求 ID 重复，覆盖未完成的旧请求");
        }
        previous
    }

    /// 取出并移除
    pub fn take(&mut self, id: &str) -> Option<PendingRequest> {
        self.pending.remove(id)
    }

    /// 移除但不返回（请求失败时使用），返回是否存在
    pub fn discard(&mut self, id: &str) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 清理发起时间早于 `now_ms - max_age_ms` 的条目，返回清理数量
    pub fn evict_older_than(&mut self, now_ms: i64, max_age_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(i64::try_from(max_age_ms).unwrap_or(i64::MAX));
        let before = self.pending.len();
        self.pending.retain(|_, entry| entry.timestamp >= cutoff);
        before - self.pending.len()
    }

    /// 会话结束时清空，返回丢弃的条目数
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteId;

    fn pending(id: &str, timestamp: i64) -> PendingRequest {
        PendingRequest {
            request_id: id.to_string(),
            timestamp,
            site: SiteId::ChatGpt,
            model: "gpt-4o".to_string(),
            prompt_preview: "hello".to_string(),
            prompt_hash: "1n1e4y".to_string(),
            tokens_in_estimate: 2,
        }
    }

    #[test]
    fn test_take_missing_is_none() {
        let mut store = CorrelationStore::new();
        assert!(store.take("nope").is_none());
    }

    #[test]
    fn test_take_consumes() {
        let mut store = CorrelationStore::new();
        store.put("1", pending("1", 0));

        assert_eq!(store.take("1").unwrap().request_id, "1");
        assert!(store.take("1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let mut store = CorrelationStore::new();
        assert!(store.put("1", pending("1", 100)).is_none());
        let previous = store.put("1", pending("1", 200)).unwrap();

        assert_eq!(previous.timestamp, 100);
        assert_eq!(store.len(), 1);
        assert_eq!(store.take("1").unwrap().timestamp, 200);
    }

    #[test]
    fn test_discard() {
        let mut store = CorrelationStore::new();
        store.put("1", pending("1", 0));

        assert!(store.discard("1"));
        assert!(!store.discard("1"));
        assert!(!store.contains("1"));
    }

    #[test]
    fn test_evict_older_than() {
        let mut store = CorrelationStore::new();
        store.put("old", pending("old", 1_000));
        store.put("edge", pending("edge", 5_000));
        store.put("new", pending("new", 9_000));

        assert_eq!(store.evict_older_than(10_000, 5_000), 1);
        assert!(!store.contains("old"));
        assert!(store.contains("edge"));
        assert!(store.contains("new"));

        assert_eq!(store.evict_older_than(10_000, u64::MAX), 0);
    }

    #[test]
    fn test_clear() {
        let mut store = CorrelationStore::new();
        store.put("1", pending("1", 0));
        store.put("2", pending("2", 0));
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }
}
