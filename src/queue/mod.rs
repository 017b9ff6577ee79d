//! Queue Position Analytics
//!
//! Forecasting and scoring over a stored history of deposit-queue samples:
//!
//! - `history`: ordered, deduplicated sample log
//! - `kinematics`: windowed velocity and acceleration estimates
//! - `forecast`: hourly constant-acceleration projection
//! - `activation`: first zero crossing plus a confidence grade
//! - `efficiency`: throughput / consistency / predictability scores
//! - `analyzer`: the aggregate report combining all of the above
//!
//! Nothing in here performs I/O; callers pass an explicit snapshot and `now`.

pub mod activation;
pub mod analyzer;
pub mod config;
pub mod efficiency;
pub mod forecast;
pub mod history;
pub mod kinematics;
pub mod sample;

pub use activation::{estimate_activation, ActivationEstimate, Confidence};
pub use analyzer::{CurrentSnapshot, QueueAnalytics, QueueAnalyzer};
pub use config::{AnalyticsConfig, EfficiencyConfig};
pub use efficiency::EfficiencyReport;
pub use forecast::{forecast, Forecast, ForecastPoint};
pub use history::{DailyPoint, SampleHistory};
pub use kinematics::{acceleration, velocity, Kinematics};
pub use sample::{HistoryEntry, QueueSample, SampleInput};
