//! The per-category control loop.
//!
//! Exactly one driver task owns each registered sink's flush path, so
//! flushes for a category never run concurrently with each other; they
//! contend only with appenders, at the sink's own buffer lock.

use super::RegistryInner;
use crate::ports::Sink;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

/// Fixed re-arm interval keeping the loop responsive independent of the
/// configured flush cadence.
const LIVENESS_INTERVAL: Duration = Duration::from_secs(30);

pub(super) async fn run(
    registry: Arc<RegistryInner>,
    category: String,
    sink: Arc<dyn Sink>,
    flush_requests: Option<mpsc::Receiver<()>>,
) {
    let policy = *sink.policy();
    let mut flush_requests = flush_requests;
    let mut flush_timer = interval_at(
        Instant::now() + policy.flush_duration,
        policy.flush_duration,
    );
    flush_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut liveness = interval_at(Instant::now() + LIVENESS_INTERVAL, LIVENESS_INTERVAL);
    liveness.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let stop = sink.stop_token();

    debug!(category = %category, "driver started");
    loop {
        tokio::select! {
            _ = stop.cancelled() => {
                let _ = registry.teardown(&category).await;
                debug!(category = %category, "driver stopped");
                break;
            }
            _ = flush_timer.tick() => {
                flush_and_touch(&registry, &category, &sink).await;
            }
            Some(()) = next_request(&mut flush_requests) => {
                flush_and_touch(&registry, &category, &sink).await;
            }
            _ = liveness.tick() => {}
        }
    }
}

/// Flush, and refresh the activity timestamp only when bytes actually
/// reached the backend. Errors keep the loop running: the buffer is
/// retained and the next timer or threshold event retries.
async fn flush_and_touch(registry: &RegistryInner, category: &str, sink: &Arc<dyn Sink>) {
    match sink.flush().await {
        Ok(0) => {}
        Ok(bytes) => {
            debug!(category = %category, bytes, "flushed");
            registry.touch(category).await;
        }
        Err(error) => {
            warn!(category = %category, error = %error, "flush failed; buffered records retained");
        }
    }
}

/// The next threshold request, or never when the sink already handed its
/// receiver out (a sink registered a second time hands it out only once).
async fn next_request(requests: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match requests {
        Some(requests) => requests.recv().await,
        None => std::future::pending().await,
    }
}
