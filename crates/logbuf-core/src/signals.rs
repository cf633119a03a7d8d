//! Signal plumbing between a sink and the driver that services it.

use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The threshold-flush handoff and stop token owned by every sink.
///
/// The flush channel is a bounded handoff of capacity 1: an appender that
/// crosses a threshold while a request is already pending waits until the
/// driver has accepted it, which bounds buffer growth under a slow or
/// absent driver.
#[derive(Debug)]
pub struct SinkSignals {
    flush_tx: mpsc::Sender<()>,
    flush_rx: Mutex<Option<mpsc::Receiver<()>>>,
    stop: CancellationToken,
}

impl SinkSignals {
    #[must_use]
    pub fn new() -> Self {
        let (flush_tx, flush_rx) = mpsc::channel(1);
        Self {
            flush_tx,
            flush_rx: Mutex::new(Some(flush_rx)),
            stop: CancellationToken::new(),
        }
    }

    /// Request a flush, waiting until the driver has capacity for it.
    pub async fn request_flush(&self) {
        // The receiver lives inside this struct, so the channel can only
        // close together with the sink itself.
        let _ = self.flush_tx.send(()).await;
    }

    /// Hand the threshold receiver to the driver. `None` after the first
    /// call.
    pub fn take_flush_requests(&self) -> Option<mpsc::Receiver<()>> {
        let mut slot = match self.flush_rx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take()
    }

    /// Clone of the token cancelled to request a graceful stop.
    #[must_use]
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }
}

impl Default for SinkSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flush_receiver_hands_out_once() {
        let signals = SinkSignals::new();
        assert!(signals.take_flush_requests().is_some());
        assert!(signals.take_flush_requests().is_none());
    }

    #[tokio::test]
    async fn flush_request_reaches_the_receiver() {
        let signals = SinkSignals::new();
        let mut requests = match signals.take_flush_requests() {
            Some(rx) => rx,
            None => unreachable!("fresh signals always hold the receiver"),
        };
        signals.request_flush().await;
        assert_eq!(requests.recv().await, Some(()));
    }

    #[tokio::test]
    async fn second_request_waits_for_the_driver() {
        let signals = SinkSignals::new();
        let mut requests = match signals.take_flush_requests() {
            Some(rx) => rx,
            None => unreachable!("fresh signals always hold the receiver"),
        };
        signals.request_flush().await;
        // One request is parked; the next one must not complete until the
        // driver drains the first.
        let second = signals.request_flush();
        tokio::pin!(second);
        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(20), second.as_mut())
                .await
                .is_err()
        );
        assert_eq!(requests.recv().await, Some(()));
        second.await;
        assert_eq!(requests.recv().await, Some(()));
    }
}
