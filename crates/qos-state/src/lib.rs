//! QoS State - data the dashboard backend serves
//!
//! Provides:
//! - Bounded per-channel log buffers fed by child processes
//! - The sliding traffic window read from `network_traffic.csv`
//! - The decision-engine CSV log

pub mod decision_log;
pub mod error;
pub mod log_store;
pub mod traffic_csv;

pub use decision_log::{parse_csv, parse_csv_line, read_decision_log};
pub use error::StateError;
pub use log_store::LogStore;
pub use traffic_csv::{parse_traffic_line, read_recent_traffic, to_snapshot, TrafficSample};
