//! Forecaster
//!
//! Projects the queue position hour by hour with a constant-acceleration model
//! seeded from the latest sample and the kinematic estimates:
//!
//! `position(h) = max(0, p0 - (v*h + a*h^2/2))`

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::history::SampleHistory;
use super::kinematics::Kinematics;

/// Projected queue state `hour` hours from now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "serialize_one_decimal")]
    pub position: f64,
    pub activated: bool,
}

/// Lazy hourly projection. Finite: yields exactly `days * 24` points.
#[derive(Debug, Clone)]
pub struct Forecast {
    origin: DateTime<Utc>,
    start_position: f64,
    kinematics: Kinematics,
    next_hour: u32,
    horizon_hours: u32,
}

impl Forecast {
    pub fn new(
        start_position: f64,
        kinematics: Kinematics,
        origin: DateTime<Utc>,
        days: u32,
    ) -> Self {
        Self {
            origin,
            start_position,
            kinematics,
            next_hour: 1,
            horizon_hours: days.saturating_mul(24),
        }
    }

    /// A forecast that yields nothing.
    pub fn empty(origin: DateTime<Utc>) -> Self {
        Self::new(0.0, Kinematics::default(), origin, 0)
    }

    pub fn horizon_hours(&self) -> u32 {
        self.horizon_hours
    }

    /// Projected position at `hour`, floored at zero.
    pub fn position_at(&self, hour: u32) -> f64 {
        let h = f64::from(hour);
        let Kinematics {
            velocity,
            acceleration,
        } = self.kinematics;
        let travelled = velocity * h + 0.5 * acceleration * h * h;
        (self.start_position - travelled).max(0.0)
    }

    fn point(&self, hour: u32) -> ForecastPoint {
        let position = self.position_at(hour);
        ForecastPoint {
            hour,
            timestamp: self.origin + Duration::hours(i64::from(hour)),
            position,
            activated: position <= 0.0,
        }
    }
}

impl Iterator for Forecast {
    type Item = ForecastPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_hour > self.horizon_hours {
            return None;
        }
        let point = self.point(self.next_hour);
        self.next_hour += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.horizon_hours.saturating_add(1).saturating_sub(self.next_hour) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Forecast {}

/// Forecast from the latest sample in `history`. Empty history, empty forecast.
pub fn forecast(
    history: &SampleHistory,
    now: DateTime<Utc>,
    days: u32,
    window_days: u32,
) -> Forecast {
    let Some(latest) = history.last() else {
        return Forecast::empty(now);
    };
    let kinematics = Kinematics::estimate(history, now, window_days);
    Forecast::new(latest.position, kinematics, now, days)
}

fn serialize_one_decimal<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64((value * 10.0).round() / 10.0)
}
