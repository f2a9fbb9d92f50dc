//! Cooperative cancellation for in-flight fetches
//!
//! An `AbortController` owns the right to cancel; every `AbortSignal` cloned
//! from it observes the cancellation. Transports are expected to race their
//! work against `AbortSignal::aborted()` and bail out early.

use tokio::sync::watch;

/// Owner side of a cancellation pair
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

/// Observer side of a cancellation pair, cheap to clone
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Get a signal tied to this controller
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Abort every signal handed out by this controller. Idempotent.
    pub fn abort(&self) {
        self.tx.send_if_modified(|aborted| {
            if *aborted {
                false
            } else {
                *aborted = true;
                true
            }
        });
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    /// A signal that can never be aborted
    pub fn never() -> Self {
        AbortController::new().signal()
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the controller aborts.
    ///
    /// If the controller is dropped without aborting, this never resolves.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_abort_is_visible_to_all_signals() {
        let controller = AbortController::new();
        let a = controller.signal();
        let b = a.clone();
        assert!(!a.is_aborted());

        controller.abort();
        controller.abort();

        assert!(a.is_aborted());
        assert!(b.is_aborted());
        assert!(controller.is_aborted());
    }

    #[test]
    fn test_signal_created_after_abort_is_aborted() {
        let controller = AbortController::new();
        controller.abort();
        assert!(controller.signal().is_aborted());
    }

    #[tokio::test]
    async fn test_aborted_future_resolves() {
        let controller = AbortController::new();
        let signal = controller.signal();

        let waiter = tokio::spawn(async move { signal.aborted().await });
        controller.abort();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("aborted() should resolve")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_signal_stays_pending() {
        let signal = AbortSignal::never();
        let result = tokio::time::timeout(Duration::from_millis(50), signal.aborted()).await;
        assert!(result.is_err());
    }
}
