//! Analytics tuning
//!
//! Windows, horizons and the heuristic scoring constants. The scoring
//! constants are empirical; they are kept here so deployments can tune them
//! without touching the estimator code.

use serde::{Deserialize, Serialize};

/// Estimator and forecaster settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trailing window for velocity/acceleration, in days
    pub window_days: u32,
    /// Default forecast horizon, in days
    pub forecast_days: u32,
    /// Default history range served by the API, in days
    pub history_days: u32,
    /// Below this many samples an activation estimate is always low confidence
    pub min_confident_samples: usize,
    /// |acceleration| above this downgrades confidence to medium
    pub volatility_threshold: f64,
    pub efficiency: EfficiencyConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            forecast_days: 30,
            history_days: 90,
            min_confident_samples: 10,
            volatility_threshold: 0.1,
            efficiency: EfficiencyConfig::default(),
        }
    }
}

/// Efficiency scoring constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Fraction of the final queue length counted as new arrivals
    pub arrival_dilution: f64,
    /// |acceleration| below this scores a perfect predictability
    pub predictability_floor: f64,
    /// Predictability lost per unit of |acceleration|, as a fraction
    pub predictability_gain: f64,
    pub throughput_weight: f64,
    pub consistency_weight: f64,
    pub predictability_weight: f64,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            arrival_dilution: 0.1,
            predictability_floor: 0.01,
            predictability_gain: 10.0,
            throughput_weight: 0.4,
            consistency_weight: 0.3,
            predictability_weight: 0.3,
        }
    }
}
