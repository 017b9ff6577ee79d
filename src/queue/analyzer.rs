//! Aggregate queue analytics
//!
//! `QueueAnalyzer` bundles the estimators behind one configuration. Every
//! method is a pure function of an explicit history snapshot and `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activation::{estimate_activation, ActivationEstimate};
use super::config::AnalyticsConfig;
use super::efficiency::{self, EfficiencyReport};
use super::forecast::{self, Forecast, ForecastPoint};
use super::history::{DailyPoint, SampleHistory};
use super::kinematics::{self, Kinematics};
use super::sample::QueueSample;

/// Latest observed queue state with freshly computed kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub queue_length: u64,
    pub position: f64,
    pub wait_time_estimate: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub stake_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// Full analytics payload served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueAnalytics {
    pub current: CurrentSnapshot,
    pub activation_estimate: ActivationEstimate,
    pub history: Vec<DailyPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub efficiency: EfficiencyReport,
}

#[derive(Debug, Clone, Default)]
pub struct QueueAnalyzer {
    config: AnalyticsConfig,
}

impl QueueAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn velocity(&self, history: &SampleHistory, now: DateTime<Utc>) -> f64 {
        kinematics::velocity(history, now, self.config.window_days)
    }

    pub fn acceleration(&self, history: &SampleHistory, now: DateTime<Utc>) -> f64 {
        kinematics::acceleration(history, now, self.config.window_days)
    }

    pub fn kinematics(&self, history: &SampleHistory, now: DateTime<Utc>) -> Kinematics {
        Kinematics::estimate(history, now, self.config.window_days)
    }

    pub fn forecast(&self, history: &SampleHistory, now: DateTime<Utc>, days: u32) -> Forecast {
        forecast::forecast(history, now, days, self.config.window_days)
    }

    pub fn estimate_activation(
        &self,
        history: &SampleHistory,
        now: DateTime<Utc>,
    ) -> ActivationEstimate {
        estimate_activation(history, now, &self.config)
    }

    pub fn efficiency(&self, history: &SampleHistory, now: DateTime<Utc>) -> EfficiencyReport {
        efficiency::score(history, now, &self.config)
    }

    /// Everything the dashboard shows, derived from one snapshot.
    ///
    /// `current` is the freshest raw observation; its stored velocity and
    /// acceleration are replaced by the estimates from `history`.
    pub fn analyze(
        &self,
        history: &SampleHistory,
        current: &QueueSample,
        now: DateTime<Utc>,
    ) -> QueueAnalytics {
        let kinematics = self.kinematics(history, now);

        QueueAnalytics {
            current: CurrentSnapshot {
                queue_length: current.queue_length,
                position: current.position,
                wait_time_estimate: current.wait_time_estimate,
                velocity: kinematics.velocity,
                acceleration: kinematics.acceleration,
                stake_rate: current.stake_rate,
                timestamp: now,
            },
            activation_estimate: self.estimate_activation(history, now),
            history: history.daily_means(),
            forecast: self
                .forecast(history, now, self.config.forecast_days)
                .collect(),
            efficiency: self.efficiency(history, now),
        }
    }
}
