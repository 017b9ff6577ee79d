//! Sample History
//!
//! Ordered, deduplicated log of queue observations. Entries are kept sorted by
//! timestamp with at most one entry per timestamp; a later append with an equal
//! timestamp replaces the earlier one.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::sample::{HistoryEntry, QueueSample};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleHistory {
    samples: Vec<QueueSample>,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from samples in any order.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = QueueSample>,
    {
        let mut history = Self::new();
        for sample in samples {
            history.append(sample);
        }
        history
    }

    /// Insert a sample, overwriting any entry with the same millisecond.
    pub fn append(&mut self, sample: QueueSample) {
        let sample = sample.with_millisecond_timestamp();
        match self
            .samples
            .binary_search_by(|s| s.timestamp.cmp(&sample.timestamp))
        {
            Ok(idx) => self.samples[idx] = sample,
            Err(idx) => self.samples.insert(idx, sample),
        }
    }

    /// Contiguous suffix of samples with `timestamp >= cutoff`.
    pub fn window(&self, cutoff: DateTime<Utc>) -> &[QueueSample] {
        let start = self.samples.partition_point(|s| s.timestamp < cutoff);
        &self.samples[start..]
    }

    pub fn since(&self, cutoff: DateTime<Utc>) -> Vec<HistoryEntry> {
        self.window(cutoff).iter().map(HistoryEntry::from).collect()
    }

    pub fn as_slice(&self) -> &[QueueSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueueSample> {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&QueueSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&QueueSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Per-day means for chart display. Days without samples are skipped.
    pub fn daily_means(&self) -> Vec<DailyPoint> {
        let mut points = Vec::new();
        let mut current: Option<(NaiveDate, DailyAccumulator)> = None;

        for sample in &self.samples {
            let day = sample.timestamp.date_naive();
            if let Some((d, acc)) = current.as_mut() {
                if *d == day {
                    acc.add(sample);
                    continue;
                }
            }

            if let Some((d, acc)) = current.take() {
                points.push(acc.finish(d));
            }
            let mut acc = DailyAccumulator::default();
            acc.add(sample);
            current = Some((day, acc));
        }

        if let Some((d, acc)) = current {
            points.push(acc.finish(d));
        }
        points
    }
}

impl<'a> IntoIterator for &'a SampleHistory {
    type Item = &'a QueueSample;
    type IntoIter = std::slice::Iter<'a, QueueSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Daily aggregate of the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub timestamp: DateTime<Utc>,
    pub queue_length: f64,
    pub position: f64,
    pub velocity: f64,
}

#[derive(Default)]
struct DailyAccumulator {
    count: usize,
    queue_length: f64,
    position: f64,
    velocity: f64,
}

impl DailyAccumulator {
    fn add(&mut self, sample: &QueueSample) {
        self.count += 1;
        self.queue_length += sample.queue_length as f64;
        self.position += sample.position;
        self.velocity += sample.velocity;
    }

    fn finish(self, day: NaiveDate) -> DailyPoint {
        let n = self.count.max(1) as f64;
        DailyPoint {
            timestamp: day.and_time(NaiveTime::MIN).and_utc(),
            queue_length: self.queue_length / n,
            position: self.position / n,
            velocity: self.velocity / n,
        }
    }
}
