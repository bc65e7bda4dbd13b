use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Key/value cache with per-entry expiry.
///
/// Absent and expired entries both read as `None`. Implementations are shared
/// across requests, so a `set` from one request may overwrite another's.
#[async_trait]
pub trait CachePort: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> anyhow::Result<()>;
    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
