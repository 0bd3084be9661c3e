use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::JobStore;
use crate::error::Result;

/// Periodically removes expired job snapshots so the store does not grow
/// with results nobody will read again.
#[derive(Clone)]
pub struct ExpiryPurger {
    store: Arc<dyn JobStore>,
    interval: Duration,
}

impl ExpiryPurger {
    pub fn new(store: Arc<dyn JobStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs a single purge pass and returns the number of removed entries.
    pub async fn run_once(&self) -> Result<u64> {
        let removed = self.store.purge_expired().await?;
        if removed > 0 {
            info!(removed, "Purged expired job snapshots");
        } else {
            debug!("No expired job snapshots to purge");
        }
        Ok(removed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
