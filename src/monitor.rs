//! Queue Monitor
//!
//! Glue between the upstream source, the history store and the analyzer.
//! Refreshes (fetch + append) are serialized; reads load a fresh snapshot
//! from the store and run the pure analytics over it.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::queue::kinematics::window_cutoff;
use crate::queue::{
    EfficiencyReport, ForecastPoint, HistoryEntry, QueueAnalytics, QueueAnalyzer, QueueSample,
    SampleHistory,
};
use crate::source::QueueSource;
use crate::store::HistoryStore;

/// Result of one refresh attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Recorded(QueueSample),
    /// Upstream unavailable; nothing was appended
    SourceUnavailable(String),
}

pub struct QueueMonitor {
    store: Arc<dyn HistoryStore>,
    source: Arc<dyn QueueSource>,
    analyzer: QueueAnalyzer,
    refresh_lock: Mutex<()>,
}

impl QueueMonitor {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        source: Arc<dyn QueueSource>,
        analyzer: QueueAnalyzer,
    ) -> Self {
        Self {
            store,
            source,
            analyzer,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn analyzer(&self) -> &QueueAnalyzer {
        &self.analyzer
    }

    /// Record one sample.
    pub async fn update(&self, sample: QueueSample) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        self.store.append(&sample.with_millisecond_timestamp())
    }

    /// Fetch the current queue status and record it.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let _guard = self.refresh_lock.lock().await;

        let input = match self.source.fetch().await {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "⚠️ Queue status unavailable, keeping last known sample");
                return Ok(RefreshOutcome::SourceUnavailable(e.to_string()));
            }
        };

        let sample = input.into_sample(Utc::now());
        self.store.append(&sample)?;
        debug!(
            position = sample.position,
            queue_length = sample.queue_length,
            "Recorded queue sample"
        );
        Ok(RefreshOutcome::Recorded(sample))
    }

    pub fn snapshot(&self) -> Result<SampleHistory> {
        self.store.load()
    }

    pub fn analytics(&self, now: DateTime<Utc>) -> Result<QueueAnalytics> {
        let history = self.snapshot()?;
        let current = history
            .last()
            .cloned()
            .unwrap_or_else(|| QueueSample::zeroed(now));
        Ok(self.analyzer.analyze(&history, &current, now))
    }

    pub fn forecast(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<ForecastPoint>> {
        let history = self.snapshot()?;
        Ok(self.analyzer.forecast(&history, now, days).collect())
    }

    pub fn history(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<HistoryEntry>> {
        let history = self.snapshot()?;
        Ok(history.since(window_cutoff(now, days)))
    }

    pub fn efficiency(&self, now: DateTime<Utc>) -> Result<EfficiencyReport> {
        let history = self.snapshot()?;
        Ok(self.analyzer.efficiency(&history, now))
    }

    /// Poll the source forever. The first tick fires immediately.
    pub async fn run_poller(self: Arc<Self>, every: Duration) {
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = every.as_secs(), "⏱️  Queue poller started");

        loop {
            tick.tick().await;
            match self.refresh().await {
                Ok(RefreshOutcome::Recorded(sample)) => {
                    info!(
                        position = sample.position,
                        queue_length = sample.queue_length,
                        "📥 Queue sample recorded"
                    );
                }
                Ok(RefreshOutcome::SourceUnavailable(_)) => {}
                Err(e) => error!(error = %e, "Failed to persist queue sample"),
            }
        }
    }
}
