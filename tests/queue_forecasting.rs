//! End-to-end checks of the forecasting pipeline through the public API:
//! samples go into a store, analytics come out of the monitor.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use csm_queue_monitor::queue::{
    acceleration, estimate_activation, forecast, velocity, AnalyticsConfig, Confidence,
    QueueAnalyzer, QueueSample, SampleHistory, SampleInput,
};
use csm_queue_monitor::source::{FetchError, QueueSource};
use csm_queue_monitor::store::{HistoryStore, SqliteHistoryStore};
use csm_queue_monitor::{QueueMonitor, RefreshOutcome};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap()
}

fn at(hours_before: i64, position: f64) -> QueueSample {
    QueueSample {
        position,
        ..QueueSample::zeroed(now() - Duration::hours(hours_before))
    }
}

/// Positions following `p(t) = p0 - v*t - a*t^2/2`, one sample per hour.
fn accelerating_history(count: i64, v: f64, a: f64) -> SampleHistory {
    SampleHistory::from_samples((0..count).map(|i| {
        let t = i as f64;
        QueueSample {
            position: 500.0 - v * t - 0.5 * a * t * t,
            ..QueueSample::zeroed(now() - Duration::hours(count - 1 - i))
        }
    }))
}

struct OfflineSource;

#[async_trait::async_trait]
impl QueueSource for OfflineSource {
    async fn fetch(&self) -> Result<SampleInput, FetchError> {
        Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY))
    }
}

#[test]
fn test_empty_history_defaults() {
    let history = SampleHistory::new();
    let config = AnalyticsConfig::default();

    assert_eq!(velocity(&history, now(), 7), 0.0);
    assert_eq!(forecast(&history, now(), 30, 7).count(), 0);
    assert_eq!(
        estimate_activation(&history, now(), &config).confidence,
        Confidence::Low
    );
}

#[test]
fn test_two_sample_scenario() {
    let history = SampleHistory::from_samples(vec![at(24, 100.0), at(0, 76.0)]);
    let config = AnalyticsConfig::default();

    assert!((velocity(&history, now(), 7) - 1.0).abs() < 1e-12);
    assert_eq!(acceleration(&history, now(), 7), 0.0);

    let day: Vec<_> = forecast(&history, now(), 1, 7).collect();
    assert_eq!(day.len(), 24);
    assert!((day[23].position - (76.0 - 24.0)).abs() < 1e-9);

    let estimate = estimate_activation(&history, now(), &config);
    assert_eq!(estimate.hours_remaining, Some(76));
    assert_eq!(estimate.confidence, Confidence::Low);
}

#[test]
fn test_velocity_non_negative_for_noisy_history() {
    let positions = [40.0, 44.0, 39.0, 47.0, 52.0, 41.0, 60.0];
    let history = SampleHistory::from_samples(
        positions
            .iter()
            .enumerate()
            .map(|(i, &p)| at((positions.len() - i) as i64 * 3, p)),
    );

    assert!(velocity(&history, now(), 7) >= 0.0);
    assert!(forecast(&history, now(), 5, 7).all(|p| p.position >= 0.0));
}

#[test]
fn test_activation_matches_first_crossing() {
    let config = AnalyticsConfig::default();
    let history = accelerating_history(24, 3.0, 0.02);

    let points: Vec<_> = forecast(&history, now(), config.forecast_days, config.window_days).collect();
    let crossing = points.iter().position(|p| p.activated).unwrap();
    assert!(points[..crossing].iter().all(|p| !p.activated));

    let estimate = estimate_activation(&history, now(), &config);
    assert_eq!(estimate.hours_remaining, Some(points[crossing].hour));
    assert_eq!(estimate.activation_time, Some(points[crossing].timestamp));
}

#[test]
fn test_confidence_drops_with_volatility() {
    let config = AnalyticsConfig::default();

    let calm = accelerating_history(12, 2.0, 0.05);
    let a_calm = acceleration(&calm, now(), 7);
    assert!(a_calm.abs() > 0.04 && a_calm.abs() <= 0.1);
    assert_eq!(
        estimate_activation(&calm, now(), &config).confidence,
        Confidence::High
    );

    let volatile = accelerating_history(12, 2.0, 0.2);
    assert!(acceleration(&volatile, now(), 7).abs() > 0.1);
    assert_eq!(
        estimate_activation(&volatile, now(), &config).confidence,
        Confidence::Medium
    );
}

#[test]
fn test_constant_rate_has_zero_acceleration_and_linear_forecast() {
    let history = accelerating_history(10, 1.5, 0.0);
    assert!(acceleration(&history, now(), 7).abs() < 1e-9);

    let points: Vec<_> = forecast(&history, now(), 2, 7).collect();
    for pair in points.windows(2).filter(|w| !w[1].activated) {
        assert!((pair[0].position - pair[1].position - 1.5).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_monitor_over_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteHistoryStore::open(dir.path().join("queue.db")).unwrap());
    let monitor = QueueMonitor::new(
        store.clone(),
        Arc::new(OfflineSource),
        QueueAnalyzer::default(),
    );

    for i in 0..12 {
        monitor
            .update(QueueSample {
                queue_length: 300 - i as u64 * 2,
                velocity: 0.5,
                ..at(11 - i, 20.0 + 0.5 * (11 - i) as f64)
            })
            .await
            .unwrap();
    }
    // Same timestamp again: replaces, does not grow.
    monitor.update(at(0, 20.0)).await.unwrap();
    assert_eq!(store.len().unwrap(), 12);

    let outcome = monitor.refresh().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::SourceUnavailable(_)));
    assert_eq!(store.len().unwrap(), 12);

    let report = monitor.analytics(now()).unwrap();
    assert_eq!(report.activation_estimate.hours_remaining, Some(40));
    assert_eq!(report.activation_estimate.confidence, Confidence::High);
    assert_eq!(report.forecast.len(), 720);
    assert!(report.efficiency.throughput > 0.0);
}
