//! Request cancellation handles
//!
//! A [`CancelHandle`] is held by the caller; the [`CancelToken`]s it hands
//! out travel with requests and are observed by the transport. Built on a
//! watch channel so one handle can cancel any number of in-flight requests.

use tokio::sync::watch;

/// Caller-side cancellation trigger
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Token to attach to an outgoing request
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel every request carrying a token from this handle
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport-side cancellation observer
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes when the handle cancels; pends forever if the handle is
    /// dropped without cancelling.
    pub async fn cancelled(mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                futures_util::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_token() {
        let handle = CancelHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        // completes immediately once cancelled
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let handle = CancelHandle::new();
        let token = handle.token();
        drop(handle);

        assert!(!token.is_cancelled());
        let timed_out = tokio::time::timeout(Duration::from_millis(20), token.cancelled())
            .await
            .is_err();
        assert!(timed_out);
    }
}
