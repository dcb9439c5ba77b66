// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Stop signal for playback.
//!
//! A `StopSignal` is a cloneable cancellation token backed by a
//! `tokio::sync::watch` channel. Once cancelled it stays cancelled.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation token shared between the caller and the tick scheduler
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Create a signal that is not yet cancelled
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Cancel the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this only returns once cancelled
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_cancel_is_shared_by_clones() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());

        signal.cancel();
        assert!(clone.is_cancelled());
        timeout(Duration::from_millis(100), clone.cancelled())
            .await
            .expect("clone should observe cancel");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let signal = StopSignal::new();
        signal.cancel();
        signal.cancel();
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_waits_for_cancel() {
        let signal = StopSignal::new();
        assert!(timeout(Duration::from_millis(30), signal.cancelled())
            .await
            .is_err());

        let canceller = signal.clone();
        tokio::spawn(async move { canceller.cancel() });

        timeout(Duration::from_millis(500), signal.cancelled())
            .await
            .expect("cancel from another task should wake the waiter");
    }
}
