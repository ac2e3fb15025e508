/// Default refresh period of the dashboard poll loop.
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Badge value reported while the QoS controller is running.
pub const QOS_ACTIVE: &str = "ACTIVE";
/// Badge value reported (or assumed) when the controller is not running.
pub const QOS_IDLE: &str = "IDLE";

/// Shown in place of the decision table when the backend has no rows.
pub const NO_DECISION_DATA: &str = "No CSV data found.";

/// Number of log lines the backend returns per channel.
pub const LOG_FETCH_LIMIT: usize = 2000;
/// Number of trailing CSV lines the backend reads for the traffic chart.
pub const TRAFFIC_WINDOW: usize = 60;

pub const API_TRAFFIC: &str = "/api/traffic";
pub const API_QOS_STATUS: &str = "/api/qos-status";
pub const API_DECISION_LOG: &str = "/api/decision-log";
pub const API_STATE_FLAGS: &str = "/api/state-flags";

/// `POST /api/run/{name}`
pub fn run_path(name: &str) -> String {
    format!("/api/run/{}", name)
}

/// `GET /api/logs/{name}`
pub fn logs_path(name: &str) -> String {
    format!("/api/logs/{}", name)
}
