//! Efficiency Scorer
//!
//! Throughput, consistency and predictability sub-scores plus a weighted
//! composite. Throughput is unbounded, so the composite is an operational
//! index rather than a percentage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::config::{AnalyticsConfig, EfficiencyConfig};
use super::history::SampleHistory;
use super::kinematics::{acceleration, hours_between};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    /// Validators processed per day
    #[serde(serialize_with = "serialize_two_decimals")]
    pub throughput: f64,
    /// 0..=100
    #[serde(serialize_with = "serialize_two_decimals")]
    pub consistency: f64,
    /// 0..=100
    #[serde(serialize_with = "serialize_two_decimals")]
    pub predictability: f64,
    #[serde(serialize_with = "serialize_two_decimals")]
    pub overall_score: f64,
}

/// Score the whole history.
pub fn score(
    history: &SampleHistory,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> EfficiencyReport {
    if history.is_empty() {
        return EfficiencyReport::default();
    }

    let weights = &config.efficiency;
    let throughput = throughput(history, weights);
    let consistency = consistency(history);
    let predictability = predictability(acceleration(history, now, config.window_days), weights);

    EfficiencyReport {
        throughput,
        consistency,
        predictability,
        overall_score: throughput * weights.throughput_weight
            + consistency * weights.consistency_weight
            + predictability * weights.predictability_weight,
    }
}

/// Validators leaving the queue per day between the first and last sample.
///
/// The raw decrease understates departures because new deposits keep joining,
/// so a fixed fraction of the final length is added back as assumed arrivals.
pub fn throughput(history: &SampleHistory, config: &EfficiencyConfig) -> f64 {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return 0.0;
    };
    if history.len() < 2 {
        return 0.0;
    }

    let days = hours_between(first.timestamp, last.timestamp) / 24.0;
    if days <= 0.0 {
        return 0.0;
    }

    let first_length = first.queue_length as f64;
    let last_length = last.queue_length as f64;
    let processed = ((first_length - last_length) + last_length * config.arrival_dilution).max(0.0);
    processed / days
}

/// `100 * (1 - cv)` of the stored velocity column, clamped to 0..=100.
pub fn consistency(history: &SampleHistory) -> f64 {
    if history.len() < 3 {
        return 0.0;
    }

    let velocities: Vec<f64> = history.iter().map(|s| s.velocity).collect();
    let mean = velocities.iter().sum::<f64>() / velocities.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }

    let cv = standard_deviation(&velocities) / mean;
    (100.0 * (1.0 - cv)).clamp(0.0, 100.0)
}

/// 100 for near-constant velocity, falling linearly with |acceleration|.
pub fn predictability(acceleration: f64, config: &EfficiencyConfig) -> f64 {
    let magnitude = acceleration.abs();
    if magnitude < config.predictability_floor {
        return 100.0;
    }
    (100.0 * (1.0 - magnitude * config.predictability_gain)).clamp(0.0, 100.0)
}

/// Sample standard deviation (n - 1)
fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;

    variance.sqrt()
}

fn serialize_two_decimals<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}
