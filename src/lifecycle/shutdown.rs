//! Shutdown coordination for the gateway.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Built on a `watch` channel so that tasks subscribing after the trigger
/// still observe it. Dropping the coordinator releases every waiter too.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// A subscription handed to one long-running task.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of tasks still holding a subscription.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the coordinator is gone.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_all_subscribers() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(shutdown.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), async {
            a.wait().await;
            b.wait().await;
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), late.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pending_until_triggered() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let waited = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
        assert!(waited.is_err());
    }
}
