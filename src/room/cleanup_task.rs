use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument};

use super::repository::RoomRepository;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a room must be inactive before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60), // 10 minutes
            inactivity_threshold: Duration::from_secs(2 * 60 * 60), // 2 hours
        }
    }
}

/// Starts the background task that periodically removes idle rooms.
///
/// Abandoned rooms hold no sockets, so nothing else ever tears them down;
/// this task is their only exit.
#[instrument(skip(repository))]
pub async fn start_cleanup_task(repository: Arc<dyn RoomRepository>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let removed = cleanup_idle_rooms(&repository, config.inactivity_threshold).await;
        if removed > 0 {
            info!(removed, "Room cleanup completed");
        }
    }
}

async fn cleanup_idle_rooms(
    repository: &Arc<dyn RoomRepository>,
    inactivity_threshold: Duration,
) -> usize {
    let idle = repository.list_idle(inactivity_threshold).await;
    for code in &idle {
        info!(code = %code, "Removing idle room");
        repository.remove(code).await;
    }
    idle.len()
}
