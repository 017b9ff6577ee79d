//! CSM Queue Monitor Library
//!
//! Deposit-queue position forecasting and efficiency scoring, plus the
//! storage, upstream client and HTTP surface the `queue-monitor` binary wires
//! together.

pub mod api;
pub mod config;
pub mod monitor;
pub mod queue;
pub mod source;
pub mod store;

pub use config::MonitorConfig;
pub use monitor::{QueueMonitor, RefreshOutcome};
