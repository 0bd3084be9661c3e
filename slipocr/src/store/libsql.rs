use async_trait::async_trait;
use chrono::Utc;
use libsql::{params, Builder, Connection};
use std::time::Duration;

use super::JobStore;
use crate::config::StoreConfig;
use crate::error::Result;

/// Durable job store backed by libSQL (local SQLite file, `:memory:` or a
/// remote `libsql://` database).
///
/// Holds a single connection so `:memory:` databases survive between calls.
#[derive(Clone)]
pub struct LibSqlJobStore {
    conn: Connection,
}

impl LibSqlJobStore {
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let db = if config.url.starts_with("libsql://") || config.url.starts_with("https://") {
            Builder::new_remote(
                config.url.clone(),
                config.auth_token.clone().unwrap_or_default(),
            )
            .build()
            .await?
        } else if config.url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let conn = db.connect()?;
        let store = Self { conn };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS job_cache (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    expires_at INTEGER NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_job_cache_expires_at ON job_cache(expires_at);
                "#,
            )
            .await?;
        Ok(())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl JobStore for LibSqlJobStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = now_millis();
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_millis);
        let updated_at = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO job_cache (key, value, expires_at, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                     expires_at = excluded.expires_at, updated_at = excluded.updated_at",
                params![key, value, expires_at, updated_at],
            )
            .await?;

        self.conn
            .execute("DELETE FROM job_cache WHERE expires_at <= ?1", params![now])
            .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM job_cache WHERE key = ?1 AND expires_at > ?2",
                params![key, now_millis()],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM job_cache WHERE key = ?1", params![key])
            .await?;
        Ok(affected > 0)
    }

    async fn ping(&self) -> Result<()> {
        let mut rows = self.conn.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM job_cache WHERE expires_at <= ?1",
                params![now_millis()],
            )
            .await?;
        Ok(removed)
    }
}
