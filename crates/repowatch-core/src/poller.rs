//! New-repository detection loop.
//!
//! - `initialize()` seeds the KnownSet from the first fetch without announcing
//! - `poll()` announces every id not seen before, in fetch order, then remembers it
//! - `run()` drives both from a fixed interval until cancelled
//!
//! The KnownSet only grows. An empty fetch (failure or genuinely empty account,
//! the source cannot tell them apart) announces nothing and changes nothing.

use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, RepoId, RepositoryRecord},
    messaging::port::MessagingPort,
    ports::RepoSource,
    render::{self, RepoAnnouncement},
};

/// Owns the set of repository ids that were already present or announced.
#[derive(Debug, Default)]
pub struct RepoDetector {
    known: HashSet<RepoId>,
}

impl RepoDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every repo as known without producing announcements.
    /// Returns how many ids were added.
    pub fn seed(&mut self, repos: &[RepositoryRecord]) -> usize {
        repos.iter().filter(|r| self.known.insert(r.id)).count()
    }

    /// Announcements for ids not seen before, in input order. Each returned id
    /// is recorded immediately, so it is never returned again.
    pub fn detect(&mut self, repos: &[RepositoryRecord]) -> Vec<RepoAnnouncement> {
        repos
            .iter()
            .filter(|r| self.known.insert(r.id))
            .map(RepoAnnouncement::from)
            .collect()
    }

    pub fn is_known(&self, id: RepoId) -> bool {
        self.known.contains(&id)
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}

/// Outcome of one poll cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub announced: usize,
    pub failed_sends: usize,
}

pub struct RepoPoller {
    source: Arc<dyn RepoSource>,
    messenger: Arc<dyn MessagingPort>,
    destination: ChatId,
    interval: Duration,
    detector: RepoDetector,
}

impl RepoPoller {
    pub fn new(
        source: Arc<dyn RepoSource>,
        messenger: Arc<dyn MessagingPort>,
        destination: ChatId,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            messenger,
            destination,
            interval,
            detector: RepoDetector::new(),
        }
    }

    pub fn detector(&self) -> &RepoDetector {
        &self.detector
    }

    /// Establish the baseline. Returns the number of repositories seeded.
    pub async fn initialize(&mut self) -> usize {
        let repos = self.source.list_repositories().await;
        let seeded = self.detector.seed(&repos);
        if seeded == 0 {
            tracing::warn!(
                "baseline fetch returned no repositories; anything visible on the next successful poll will be announced"
            );
        } else {
            tracing::info!(seeded, "seeded known repositories");
        }
        seeded
    }

    /// One fetch-diff-notify cycle.
    pub async fn poll(&mut self) -> PollReport {
        let repos = self.source.list_repositories().await;
        let announcements = self.detector.detect(&repos);

        let mut report = PollReport {
            fetched: repos.len(),
            announced: announcements.len(),
            failed_sends: 0,
        };

        for a in &announcements {
            tracing::info!(repo = %a.name, url = %a.url, "announcing new repository");
            let msg = render::announcement(a);
            if let Err(e) = self.messenger.send_message(self.destination, &msg).await {
                // The id stays known: one attempt per repository.
                report.failed_sends += 1;
                tracing::warn!(repo = %a.name, "failed to announce repository: {e}");
            }
        }

        tracing::debug!(
            fetched = report.fetched,
            announced = report.announced,
            known = self.detector.known_count(),
            "poll cycle finished"
        );
        report
    }

    /// Seed, then poll every interval until `cancel` fires.
    ///
    /// Cycles never overlap: the next tick is only awaited after the current
    /// cycle finished, and ticks missed meanwhile are skipped.
    pub async fn run(mut self, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = self.initialize() => {}
        }

        let mut tick = interval_at(Instant::now() + self.interval, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "repository poller started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    self.poll().await;
                }
            }
        }

        tracing::info!("repository poller stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
