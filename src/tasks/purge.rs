//! Expiration Purge Task
//!
//! Background task that eagerly removes expired entries. Reads already treat
//! expired entries as absent; the sweep only returns their bytes sooner.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::group::GroupRegistry;

/// Spawns a task that purges expired entries from every group in `registry`
/// once per `interval`.
///
/// Groups created or destroyed after the task starts are picked up on the
/// next sweep. Abort the returned handle to stop it.
pub fn spawn_purge_task(registry: Arc<GroupRegistry>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting expiration purge task");

        loop {
            tokio::time::sleep(interval).await;

            for group in registry.groups() {
                let removed = group.purge_expired();
                if removed > 0 {
                    info!(group = %group.name(), removed, "purged expired entries");
                } else {
                    debug!(group = %group.name(), "no expired entries found");
                }
            }
        }
    })
}
