//! Idle-service eviction.

use super::RegistryInner;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// One periodic task per registry: each tick scans a snapshot of the map
/// and evicts every service idle past its policy's expiry.
pub(super) async fn run(
    registry: Arc<RegistryInner>,
    sweep_interval: Duration,
    shutdown: CancellationToken,
) {
    let mut tick = tokio::time::interval_at(
        tokio::time::Instant::now() + sweep_interval,
        sweep_interval,
    );
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!("expiration sweeper started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("expiration sweeper stopped");
                return;
            }
            _ = tick.tick() => {}
        }

        let now = Instant::now();
        let expired: Vec<String> = {
            let services = registry.services.read().await;
            services
                .iter()
                .filter(|(_, service)| {
                    now.duration_since(service.last_activity) >= service.policy.expire_duration
                })
                .map(|(category, _)| category.clone())
                .collect()
        };

        // Teardowns run concurrently and tolerate a service having been
        // torn down by another path since the snapshot.
        for category in expired {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                info!(category = %category, "idle log service expired");
                if let Some((stop, _driver)) = registry.teardown(&category).await {
                    stop.cancel();
                }
            });
        }
    }
}
