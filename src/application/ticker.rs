//! Elapsed-time ticker scoped to a recording session

use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Tick resolution of the elapsed counter
pub const TICK_PERIOD: StdDuration = StdDuration::from_secs(1);

/// Background task that emits one tick per period until cancelled.
///
/// Dropping the ticker aborts the task, so a ticker can never outlive the
/// session that owns it.
#[derive(Debug)]
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
    ticks: mpsc::UnboundedReceiver<()>,
}

impl ElapsedTicker {
    /// Spawn a ticker on the current tokio runtime.
    /// The first tick fires one full period after spawning.
    pub fn spawn(period: StdDuration) -> Self {
        let (tx, ticks) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { handle, ticks }
    }

    /// Wait for the next tick
    pub async fn next_tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    /// Take a tick that is already pending, without waiting
    pub fn try_tick(&mut self) -> bool {
        self.ticks.try_recv().is_ok()
    }

    /// Stop ticking and discard pending ticks
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
