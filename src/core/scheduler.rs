use crate::core::cycle::{CycleOrchestrator, CycleReport};
use crate::domain::ports::{Channel, Clock, FeedSource, SeenStore};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Runs one cycle per `interval` until `shutdown` resolves.
///
/// Cycles run inside this single task, so a slow cycle delays the next tick
/// instead of overlapping with it. Errors are already logged by the
/// orchestrator; the loop simply moves on to the next tick.
pub async fn run_scheduled<F, S, C, K, Sh>(
    orchestrator: &mut CycleOrchestrator<F, S, C, K>,
    interval: Duration,
    shutdown: Sh,
) -> ScheduleSummary
where
    F: FeedSource,
    S: SeenStore,
    C: Channel,
    K: Clock,
    Sh: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut summary = ScheduleSummary::default();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(cycles = summary.cycles, "Scheduler stopping");
                break;
            }
            _ = ticker.tick() => {
                let outcome = orchestrator.run_cycle().await;
                summary.record(&outcome);
            }
        }
    }
    summary
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub cycles: usize,
    pub failed_cycles: usize,
    pub announcements: usize,
}

impl ScheduleSummary {
    fn record<E>(&mut self, outcome: &Result<CycleReport, E>) {
        self.cycles += 1;
        match outcome {
            Ok(report) => self.announcements += report.notified.len(),
            Err(_) => self.failed_cycles += 1,
        }
    }
}
