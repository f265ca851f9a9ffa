//! The host-owned shutdown trigger and its read-only observers.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Shutdown trigger owned by the hosting service.
///
/// Fires once; every observer sees the same running → stopping transition.
/// Triggering again is a no-op.
#[derive(Debug, Clone, Default)]
pub struct LifecycleSignal {
    token: CancellationToken,
}

impl LifecycleSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a read-only view for a component.
    pub fn observe(&self) -> LifecycleObserver {
        LifecycleObserver {
            token: self.token.clone(),
        }
    }

    /// Fire the signal. Returns `true` only for the call that caused the
    /// transition.
    pub fn trigger(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        tracing::info!("Lifecycle signal triggered");
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Read-only view of a [`LifecycleSignal`].
#[derive(Debug, Clone)]
pub struct LifecycleObserver {
    token: CancellationToken,
}

impl LifecycleObserver {
    /// Resolves once the signal fires; immediately if it already has.
    pub fn stopping(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn is_stopping(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn every_observer_sees_the_transition() {
        let signal = LifecycleSignal::new();
        let a = signal.observe();
        let b = signal.observe();

        let wait_a = tokio::spawn(async move { a.stopping().await });
        let wait_b = tokio::spawn(async move { b.stopping().await });

        assert!(signal.trigger());
        tokio::time::timeout(Duration::from_secs(1), wait_a).await.unwrap().unwrap();
        tokio::time::timeout(Duration::from_secs(1), wait_b).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn trigger_is_idempotent() {
        let signal = LifecycleSignal::new();
        assert!(!signal.is_triggered());
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn late_observer_resolves_immediately() {
        let signal = LifecycleSignal::new();
        signal.trigger();
        let late = signal.observe();
        assert!(late.is_stopping());
        tokio::time::timeout(Duration::from_millis(10), late.stopping())
            .await
            .unwrap();
    }
}
