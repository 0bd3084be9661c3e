//! Key-value persistence of job snapshots with expiry.

mod libsql;
mod memory;
mod purge;

pub use self::libsql::LibSqlJobStore;
pub use memory::MemoryJobStore;
pub use purge::ExpiryPurger;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::Result;

/// Storage key of a job snapshot.
pub fn result_key(job_id: &str) -> String {
    format!("ocr:result:{job_id}")
}

/// Opaque string values addressed by key, each living for its TTL.
///
/// Expired entries read as absent. Any `Err` means the store itself could
/// not be reached.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn ping(&self) -> Result<()>;
    /// Drops expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64>;
}

/// Opens the store selected by `JOB_STORE_URL`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn JobStore>> {
    if config.is_in_process() {
        tracing::info!(capacity = config.capacity, "Using in-process job store");
        Ok(Arc::new(MemoryJobStore::new(config.capacity)))
    } else {
        tracing::info!(url = %config.url, "Using libSQL job store");
        Ok(Arc::new(LibSqlJobStore::open(config).await?))
    }
}
