//! Queue observation types
//!
//! `QueueSample` is the stored record; `SampleInput` is the loosely-typed shape
//! the upstream status endpoint returns.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One observation of the deposit queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSample {
    pub timestamp: DateTime<Utc>,
    /// Total validators waiting ahead in the queue
    pub queue_length: u64,
    /// Our remaining distance to the front
    pub position: f64,
    /// Upstream wait estimate in hours (advisory)
    pub wait_time_estimate: f64,
    /// Positions cleared per hour
    pub velocity: f64,
    /// Change in velocity per hour
    pub acceleration: f64,
    pub stake_rate: f64,
}

impl QueueSample {
    /// Timestamps are kept at millisecond precision, the resolution of the
    /// persisted history.
    pub fn with_millisecond_timestamp(mut self) -> Self {
        self.timestamp = self.timestamp.trunc_subsecs(3);
        self
    }

    /// Zeroed sample stamped `now`, used when nothing better is known.
    pub fn zeroed(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now,
            queue_length: 0,
            position: 0.0,
            wait_time_estimate: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            stake_rate: 0.0,
        }
    }
}

/// Raw queue status as reported by the CSM API.
///
/// Every field is optional on the wire; missing numbers default to zero and a
/// missing timestamp resolves to the time of ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleInput {
    pub queue_length: u64,
    pub position: f64,
    pub wait_time_estimate: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub stake_rate: f64,
    /// Unix seconds
    pub timestamp: Option<i64>,
}

impl SampleInput {
    pub fn into_sample(self, now: DateTime<Utc>) -> QueueSample {
        let timestamp = self
            .timestamp
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| now.trunc_subsecs(3));

        QueueSample {
            timestamp,
            queue_length: self.queue_length,
            position: non_negative(self.position),
            wait_time_estimate: non_negative(self.wait_time_estimate),
            velocity: non_negative(self.velocity),
            acceleration: if self.acceleration.is_finite() {
                self.acceleration
            } else {
                0.0
            },
            stake_rate: non_negative(self.stake_rate),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Row returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub queue_length: u64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub wait_time_estimate: f64,
}

impl From<&QueueSample> for HistoryEntry {
    fn from(sample: &QueueSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            queue_length: sample.queue_length,
            position: sample.position,
            velocity: sample.velocity,
            acceleration: sample.acceleration,
            wait_time_estimate: sample.wait_time_estimate,
        }
    }
}
