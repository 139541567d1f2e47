use tokio::sync::watch;

/// Fires the paired [`CancelSignal`]. In the embedding application this is
/// held by the navigation layer: leaving the page mid-request fires it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cooperative cancellation for an in-flight API call. The call races its
/// HTTP future against [`cancelled`](CancelSignal::cancelled); losing the
/// race returns `ApiError::Cancelled`.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelSignal {
    /// A signal that never fires, for call sites with nothing to cancel.
    pub fn none() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the paired handle fires. Never resolves for a signal
    /// whose handle was dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped silent: this call can no longer be cancelled.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn fired_handle_resolves_the_signal() {
        let (handle, signal) = cancel_pair();
        assert!(!signal.is_cancelled());

        handle.cancel();
        assert!(signal.is_cancelled());
        // must resolve promptly
        tokio::time::timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("cancelled() should resolve after cancel()");
    }

    #[tokio::test]
    async fn silent_signal_never_resolves() {
        let signal = CancelSignal::none();
        let raced = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(raced.is_err(), "none() signal must never resolve");
    }

    #[tokio::test]
    async fn clones_observe_the_same_cancellation() {
        let (handle, signal) = cancel_pair();
        let clone = signal.clone();
        handle.cancel();
        assert!(clone.is_cancelled());
    }
}
