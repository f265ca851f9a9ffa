//! Heartbeat loop.
//!
//! # States
//! ```text
//! Idle → Announcing(first) → WaitingForTick ⇄ Announcing(periodic) → Stopped
//! ```
//! `Stopped` is reached only through the lifecycle signal, or right after
//! the first announce in one-shot mode. Announce failures never stop the loop.
//!
//! # Design Decisions
//! - Announces from one loop are strictly sequential
//! - Missed ticks are delayed, never queued or bursted
//! - No retry within a round; the next tick is the retry

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::LifecycleObserver;
use crate::registrar::{AnnounceError, Cadence};

/// Something that can announce this instance once.
pub trait Announce: Send + Sync + 'static {
    fn announce_once(&self) -> impl Future<Output = Result<(), AnnounceError>> + Send;
}

/// Observable position of a heartbeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Announcing,
    WaitingForTick,
    Stopped,
}

/// Outcome counts for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatReport {
    pub succeeded: u64,
    pub failed: u64,
    /// Announces cut short by the lifecycle signal.
    pub interrupted: u64,
}

impl HeartbeatReport {
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Drives an announcer on a fixed cadence until shutdown.
pub struct HeartbeatLoop<A> {
    announcer: Arc<A>,
    cadence: Cadence,
    state: watch::Sender<LoopState>,
}

impl<A: Announce> HeartbeatLoop<A> {
    pub fn new(announcer: Arc<A>, cadence: Cadence) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            announcer,
            cadence,
            state,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Subscribe to state transitions.
    pub fn state(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Announce immediately, then once per interval until `observer` reports
    /// stopping. In one-shot mode returns right after the first announce.
    pub async fn run(&self, observer: &LifecycleObserver) -> HeartbeatReport {
        let mut report = HeartbeatReport::default();
        let mut consecutive_failures = 0u64;

        tracing::info!(cadence = %self.cadence, "Heartbeat starting");

        let running = self
            .announce_round(observer, &mut report, &mut consecutive_failures)
            .await;

        if !running {
            return self.stop(report);
        }
        let Some(period) = self.cadence.interval() else {
            tracing::debug!("One-shot cadence, heartbeat done");
            return self.stop(report);
        };

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.state.send_replace(LoopState::WaitingForTick);

            tokio::select! {
                biased;
                _ = observer.stopping() => break,
                _ = ticker.tick() => {}
            }

            if !self
                .announce_round(observer, &mut report, &mut consecutive_failures)
                .await
            {
                break;
            }
        }

        self.stop(report)
    }

    /// One announce, raced against shutdown. Returns `false` if the lifecycle
    /// signal cut the call short.
    async fn announce_round(
        &self,
        observer: &LifecycleObserver,
        report: &mut HeartbeatReport,
        consecutive_failures: &mut u64,
    ) -> bool {
        self.state.send_replace(LoopState::Announcing);

        // The announce is polled first so the call is always issued, even if
        // shutdown is already underway.
        let result = tokio::select! {
            biased;
            result = self.announcer.announce_once() => result,
            _ = observer.stopping() => {
                report.interrupted += 1;
                tracing::debug!("Announce cut short by shutdown");
                return false;
            }
        };

        match result {
            Ok(()) => {
                report.succeeded += 1;
                if *consecutive_failures > 0 {
                    tracing::info!(
                        after_failures = *consecutive_failures,
                        "Heartbeat recovered"
                    );
                }
                *consecutive_failures = 0;
            }
            Err(e) => {
                report.failed += 1;
                *consecutive_failures += 1;
                tracing::debug!(
                    consecutive_failures = *consecutive_failures,
                    kind = e.kind(),
                    "Heartbeat round failed, retrying next tick"
                );
            }
        }
        true
    }

    fn stop(&self, report: HeartbeatReport) -> HeartbeatReport {
        self.state.send_replace(LoopState::Stopped);
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            interrupted = report.interrupted,
            "Heartbeat stopped"
        );
        report
    }
}
