//! Activation Estimator
//!
//! Finds the first forecast hour at which the projected position reaches zero
//! and grades how far that projection can be trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::AnalyticsConfig;
use super::forecast::Forecast;
use super::history::SampleHistory;
use super::kinematics::Kinematics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// First matching rule wins: thin history, then volatility.
    pub fn grade(sample_count: usize, acceleration: f64, config: &AnalyticsConfig) -> Self {
        if sample_count < config.min_confident_samples {
            Confidence::Low
        } else if acceleration.abs() > config.volatility_threshold {
            Confidence::Medium
        } else {
            Confidence::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationEstimate {
    pub activation_time: Option<DateTime<Utc>>,
    pub hours_remaining: Option<u32>,
    pub days_remaining: Option<f64>,
    pub confidence: Confidence,
}

impl ActivationEstimate {
    /// No activation inside the horizon (or no data at all).
    pub fn unknown() -> Self {
        Self {
            activation_time: None,
            hours_remaining: None,
            days_remaining: None,
            confidence: Confidence::Low,
        }
    }
}

/// Activation estimate over the configured default horizon.
pub fn estimate_activation(
    history: &SampleHistory,
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> ActivationEstimate {
    let Some(latest) = history.last() else {
        return ActivationEstimate::unknown();
    };

    let kinematics = Kinematics::estimate(history, now, config.window_days);
    let mut forecast = Forecast::new(latest.position, kinematics, now, config.forecast_days);

    let Some(point) = forecast.find(|p| p.activated) else {
        return ActivationEstimate::unknown();
    };

    let days = f64::from(point.hour) / 24.0;
    ActivationEstimate {
        activation_time: Some(point.timestamp),
        hours_remaining: Some(point.hour),
        days_remaining: Some((days * 10.0).round() / 10.0),
        confidence: Confidence::grade(history.len(), kinematics.acceleration, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::forecast::forecast;
    use crate::queue::sample::QueueSample;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 8, 0, 0).unwrap()
    }

    /// `count` hourly samples ending at `now()`, clearing `rate` positions per hour.
    fn linear_history(count: i64, end_position: f64, rate: f64) -> SampleHistory {
        SampleHistory::from_samples((0..count).map(|i| {
            let hours_before = count - 1 - i;
            QueueSample {
                position: end_position + rate * hours_before as f64,
                ..QueueSample::zeroed(now() - Duration::hours(hours_before))
            }
        }))
    }

    #[test]
    fn test_empty_history_is_unknown() {
        let estimate = estimate_activation(&SampleHistory::new(), now(), &AnalyticsConfig::default());
        assert_eq!(estimate, ActivationEstimate::unknown());
        assert_eq!(estimate.confidence, Confidence::Low);
    }

    #[test]
    fn test_no_progress_is_unknown() {
        let history = linear_history(12, 40.0, 0.0);
        let estimate = estimate_activation(&history, now(), &AnalyticsConfig::default());
        assert!(estimate.hours_remaining.is_none());
        assert_eq!(estimate.confidence, Confidence::Low);
    }

    #[test]
    fn test_two_samples_low_confidence() {
        let history = linear_history(2, 76.0, 1.0);
        let estimate = estimate_activation(&history, now(), &AnalyticsConfig::default());

        assert_eq!(estimate.hours_remaining, Some(76));
        assert_eq!(estimate.days_remaining, Some(3.2));
        assert_eq!(estimate.activation_time, Some(now() + Duration::hours(76)));
        assert_eq!(estimate.confidence, Confidence::Low);
    }

    #[test]
    fn test_matches_first_activated_forecast_point() {
        let config = AnalyticsConfig::default();
        let history = linear_history(12, 30.0, 0.7);

        let first = forecast(&history, now(), config.forecast_days, config.window_days)
            .find(|p| p.activated)
            .unwrap();
        let estimate = estimate_activation(&history, now(), &config);

        assert_eq!(estimate.hours_remaining, Some(first.hour));
        assert_eq!(estimate.confidence, Confidence::High);
    }

    #[test]
    fn test_beyond_horizon_is_unknown() {
        let config = AnalyticsConfig {
            forecast_days: 1,
            ..Default::default()
        };
        let history = linear_history(12, 500.0, 1.0);
        assert!(estimate_activation(&history, now(), &config)
            .activation_time
            .is_none());
    }

    #[test]
    fn test_confidence_grading() {
        let config = AnalyticsConfig::default();
        assert_eq!(Confidence::grade(9, 0.0, &config), Confidence::Low);
        assert_eq!(Confidence::grade(10, 0.05, &config), Confidence::High);
        assert_eq!(Confidence::grade(10, 0.2, &config), Confidence::Medium);
        assert_eq!(Confidence::grade(10, -0.2, &config), Confidence::Medium);
        assert_eq!(Confidence::grade(4, 0.2, &config), Confidence::Low);
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Confidence::Medium).unwrap(),
            "\"medium\""
        );
    }
}
