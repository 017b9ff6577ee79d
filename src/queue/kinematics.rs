//! Kinematic Estimator
//!
//! Derives queue velocity (positions cleared per hour) and acceleration
//! (change in velocity per hour) from a trailing window of the history.
//!
//! Acceleration is the difference of the two half-window velocities divided by
//! the distance between the halves' mean timestamps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::history::SampleHistory;
use super::sample::QueueSample;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Velocity and acceleration estimated from the same history snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub velocity: f64,
    pub acceleration: f64,
}

impl Kinematics {
    pub fn estimate(history: &SampleHistory, now: DateTime<Utc>, window_days: u32) -> Self {
        Self {
            velocity: velocity(history, now, window_days),
            acceleration: acceleration(history, now, window_days),
        }
    }
}

/// Average rate of position decrease over the window, never negative.
///
/// Falls back to the last stored velocity with fewer than two samples, and to
/// the full history's endpoints when the window holds fewer than two.
pub fn velocity(history: &SampleHistory, now: DateTime<Utc>, window_days: u32) -> f64 {
    let samples = history.as_slice();
    if samples.len() < 2 {
        return history.last().map(|s| s.velocity.max(0.0)).unwrap_or(0.0);
    }

    let window = history.window(window_cutoff(now, window_days));
    let span = if window.len() >= 2 { window } else { samples };

    match segment_rate(span) {
        // A rising position is no progress, not negative progress.
        Some(rate) => rate.max(0.0),
        None => 0.0,
    }
}

/// Change in velocity per hour between the older and newer half of the window.
pub fn acceleration(history: &SampleHistory, now: DateTime<Utc>, window_days: u32) -> f64 {
    let window = history.window(window_cutoff(now, window_days));
    if window.len() < 3 {
        return 0.0;
    }

    let (first_half, second_half) = window.split_at(window.len() / 2);
    let (Some(first_velocity), Some(second_velocity)) =
        (segment_rate(first_half), segment_rate(second_half))
    else {
        return 0.0;
    };

    let anchor = window[0].timestamp;
    let hours_between = mean_offset_hours(second_half, anchor) - mean_offset_hours(first_half, anchor);
    if hours_between <= 0.0 {
        return 0.0;
    }

    (second_velocity - first_velocity) / hours_between
}

pub(crate) fn window_cutoff(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Unclamped (first - last) position change per hour across a segment.
fn segment_rate(segment: &[QueueSample]) -> Option<f64> {
    let (first, last) = match segment {
        [first, .., last] => (first, last),
        _ => return None,
    };

    let hours = hours_between(first.timestamp, last.timestamp);
    if hours <= 0.0 {
        return None;
    }
    Some((first.position - last.position) / hours)
}

fn mean_offset_hours(segment: &[QueueSample], anchor: DateTime<Utc>) -> f64 {
    if segment.is_empty() {
        return 0.0;
    }
    let total: f64 = segment
        .iter()
        .map(|s| hours_between(anchor, s.timestamp))
        .sum();
    total / segment.len() as f64
}
