use crate::core::notifier::Notifier;
use crate::core::upcoming::select_upcoming;
use crate::domain::model::Contest;
use crate::domain::ports::{Channel, Clock, FeedSource, SeenStore};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Diffing,
    Notifying,
    Persisting,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub upcoming: usize,
    pub notified: Vec<String>,
    pub failed: Vec<String>,
    pub pruned: usize,
    pub persisted: bool,
    pub save_error: Option<String>,
}

impl CycleReport {
    pub fn attempted(&self) -> usize {
        self.notified.len() + self.failed.len()
    }
}

/// Runs fetch -> diff -> notify -> persist against injected ports.
///
/// The seen-set is loaded at the start of every cycle and is owned by that
/// cycle alone; callers must not run two cycles concurrently against the same
/// store. Taking `&mut self` enforces that within one process.
pub struct CycleOrchestrator<F, S, C, K>
where
    F: FeedSource,
    S: SeenStore,
    C: Channel,
    K: Clock,
{
    feed: F,
    store: S,
    notifier: Notifier<C>,
    clock: K,
    phase: CyclePhase,
}

impl<F, S, C, K> CycleOrchestrator<F, S, C, K>
where
    F: FeedSource,
    S: SeenStore,
    C: Channel,
    K: Clock,
{
    pub fn new(feed: F, store: S, notifier: Notifier<C>, clock: K) -> Self {
        Self {
            feed,
            store,
            notifier,
            clock,
            phase: CyclePhase::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier<C> {
        &self.notifier
    }

    fn enter(&mut self, phase: CyclePhase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "Cycle phase change");
        self.phase = phase;
    }

    /// Executes one full cycle. Fetch and load failures abort the cycle
    /// before anything is sent or written; delivery and save failures are
    /// logged and reported in the returned [`CycleReport`].
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let result = self.run_phases().await;
        self.enter(CyclePhase::Idle);
        result
    }

    async fn run_phases(&mut self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        self.enter(CyclePhase::Fetching);
        let seen = self.store.load().await.map_err(|e| {
            tracing::error!(error = %e, "Aborting cycle: could not load seen-set");
            e
        })?;
        let all = self.feed.fetch().await.map_err(|e| {
            tracing::error!(error = %e, "Aborting cycle: could not fetch contests");
            e
        })?;
        report.fetched = all.len();

        self.enter(CyclePhase::Diffing);
        let now = self.clock.now();
        let upcoming = select_upcoming(&all, now);
        report.upcoming = upcoming.len();
        let to_notify: Vec<&Contest> = upcoming.iter().filter(|c| !seen.contains(&c.id)).collect();
        tracing::debug!(
            fetched = report.fetched,
            upcoming = report.upcoming,
            new = to_notify.len(),
            "Diffed feed against seen-set"
        );

        if to_notify.is_empty() {
            tracing::info!(upcoming = report.upcoming, "No new contests to announce");
            return Ok(report);
        }

        self.enter(CyclePhase::Notifying);
        let mut delivered = Vec::with_capacity(to_notify.len());
        for contest in to_notify {
            match self.notifier.notify(contest, now).await {
                Ok(()) => {
                    tracing::info!(contest_id = %contest.id, title = %contest.title, "Announced contest");
                    report.notified.push(contest.id.clone());
                    delivered.push(contest.clone());
                }
                Err(e) => {
                    tracing::warn!(contest_id = %contest.id, error = %e, "Announcement failed");
                    report.failed.push(contest.id.clone());
                }
            }
        }

        self.enter(CyclePhase::Persisting);
        let mut next = seen;
        for contest in &upcoming {
            if next.contains(&contest.id) {
                next.insert(contest.clone());
            }
        }
        for contest in delivered {
            next.insert(contest);
        }
        report.pruned = next.prune_started(now);

        match self.store.save(&next).await {
            Ok(()) => {
                report.persisted = true;
                tracing::debug!(entries = next.len(), pruned = report.pruned, "Saved seen-set");
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not save seen-set; contests may be announced again");
                report.save_error = Some(e.to_string());
            }
        }

        tracing::info!(
            notified = report.notified.len(),
            failed = report.failed.len(),
            "Cycle finished"
        );
        Ok(report)
    }
}
